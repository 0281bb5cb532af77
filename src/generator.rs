use std::{fmt, ops::RangeInclusive, str::FromStr};

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    graph::ContactGraph,
};

const ID_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const NAME_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ID_LEN: usize = 6;

/// How close people generally are. Each level is a range that edge weights are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactLevel {
    High,
    Medium,
    Low,
}

impl ContactLevel {
    pub fn range(&self) -> RangeInclusive<f64> {
        match self {
            ContactLevel::High => 0.65..=1.0,
            ContactLevel::Medium => 0.45..=0.6,
            ContactLevel::Low => 0.05..=0.4,
        }
    }
}

impl FromStr for ContactLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(ContactLevel::High),
            "medium" => Ok(ContactLevel::Medium),
            "low" => Ok(ContactLevel::Low),
            _ => Err(Error::UnknownContactLevel(s.to_string())),
        }
    }
}

impl fmt::Display for ContactLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContactLevel::High => "high",
            ContactLevel::Medium => "medium",
            ContactLevel::Low => "low",
        };
        f.write_str(name)
    }
}

/// Procedural generator for contact graphs.
///
/// Each group of people is joined by a random spanning tree, then roughly a fifth
/// more random contacts are sprinkled in. A partitioned graph splits people into
/// two halves that never touch.
#[derive(Debug, Clone)]
pub struct GraphGenerator {
    population: usize,
    contact_level: ContactLevel,
    connected: bool,
    seed: Option<u64>,
}

impl GraphGenerator {
    pub fn new(population: usize) -> Self {
        Self {
            population,
            contact_level: ContactLevel::Medium,
            connected: true,
            seed: None,
        }
    }

    pub fn contact_level(mut self, contact_level: ContactLevel) -> Self {
        self.contact_level = contact_level;
        self
    }

    /// `false` splits the population into two components
    pub fn connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    /// Fixes the random seed for reproducible graphs
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn generate(&self) -> Result<ContactGraph> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.generate_with(&mut rng)
    }

    pub fn generate_with<R: Rng>(&self, rng: &mut R) -> Result<ContactGraph> {
        let mut graph = ContactGraph::new();
        let mut ids = Vec::with_capacity(self.population);

        for _ in 0..self.population {
            let (id, name) = loop {
                let (id, name) = generate_id_and_name(rng);
                if graph.person(&id).is_none() {
                    break (id, name);
                }
            };
            graph.add_vertex(&id, &name, rng.gen_range(18..=55), rng.gen_range(0.0..1.0));
            ids.push(id);
        }

        if self.connected || ids.len() < 2 {
            self.connect_group(&mut graph, &ids, rng)?;
        } else {
            let (left, right) = ids.split_at(ids.len() / 2);
            self.connect_group(&mut graph, left, rng)?;
            self.connect_group(&mut graph, right, rng)?;
        }

        debug!(
            people = graph.len(),
            contacts = graph.edge_count(),
            connected = self.connected,
            level = %self.contact_level,
            "generated contact graph"
        );
        Ok(graph)
    }

    fn connect_group<R: Rng>(&self, graph: &mut ContactGraph, group: &[String], rng: &mut R) -> Result<()> {
        let n = group.len();
        if n < 2 {
            return Ok(());
        }

        let mut order: Vec<&String> = group.iter().collect();
        order.shuffle(rng);

        for i in 1..n {
            let j = rng.gen_range(0..i);
            graph.add_edge(order[i], order[j], self.draw_weight(rng))?;
        }

        let max_edges = n * (n - 1) / 2;
        let extra = (n / 5 + 1).min(max_edges - (n - 1));
        let mut added = 0;
        let mut attempts = 0;
        while added < extra && attempts < 100 * (extra + 1) {
            attempts += 1;
            let a = rng.gen_range(0..n);
            let b = rng.gen_range(0..n);
            if a == b || graph.get_contact_level(&group[a], &group[b]) > 0.0 {
                continue;
            }
            graph.add_edge(&group[a], &group[b], self.draw_weight(rng))?;
            added += 1;
        }
        Ok(())
    }

    fn draw_weight<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.contact_level.range())
    }
}

/// A random six character identifier and a pair of initials, like `("Q7ZK2M", "R. T")`
pub fn generate_id_and_name<R: Rng>(rng: &mut R) -> (String, String) {
    let id = (0..ID_LEN)
        .map(|_| ID_CHARS[rng.gen_range(0..ID_CHARS.len())] as char)
        .collect();
    let first = NAME_CHARS[rng.gen_range(0..NAME_CHARS.len())] as char;
    let last = NAME_CHARS[rng.gen_range(0..NAME_CHARS.len())] as char;
    (id, format!("{first}. {last}"))
}

#[cfg(test)]
mod test {
    use std::collections::{HashSet, VecDeque};

    use super::*;

    fn component_sizes(graph: &ContactGraph) -> Vec<usize> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut sizes = vec![];
        for p in graph.people() {
            if !seen.insert(p.identifier.as_str()) {
                continue;
            }
            let mut size = 0;
            let mut queue = VecDeque::from([p.identifier.as_str()]);
            while let Some(cur) = queue.pop_front() {
                size += 1;
                for n in graph.neighbours_of(cur).unwrap() {
                    if seen.insert(n) {
                        queue.push_back(n);
                    }
                }
            }
            sizes.push(size);
        }
        sizes.sort();
        sizes
    }

    #[test]
    fn test_contact_level_parse() {
        assert_eq!("High".parse::<ContactLevel>().unwrap(), ContactLevel::High);
        assert_eq!(" low ".parse::<ContactLevel>().unwrap(), ContactLevel::Low);
        assert!(matches!(
            "extreme".parse::<ContactLevel>(),
            Err(Error::UnknownContactLevel(_))
        ));
        assert_eq!(ContactLevel::Medium.to_string(), "medium");
    }

    #[test]
    fn test_connected_graph() {
        for population in [11, 20, 37, 60] {
            let graph = GraphGenerator::new(population).seed(7).generate().unwrap();
            assert_eq!(graph.len(), population);
            assert_eq!(graph.edge_count(), population + population / 5);
            assert_eq!(component_sizes(&graph), vec![population]);
        }
    }

    #[test]
    fn test_partitioned_graph() {
        let graph = GraphGenerator::new(30)
            .connected(false)
            .seed(3)
            .generate()
            .unwrap();
        assert_eq!(graph.len(), 30);
        assert_eq!(component_sizes(&graph), vec![15, 15]);
    }

    #[test]
    fn test_weights_in_bucket() {
        for level in [ContactLevel::High, ContactLevel::Medium, ContactLevel::Low] {
            let graph = GraphGenerator::new(40)
                .contact_level(level)
                .seed(11)
                .generate()
                .unwrap();
            let range = level.range();
            assert!(graph.edges().all(|(_, _, w)| range.contains(&w)));
        }
    }

    #[test]
    fn test_same_seed_same_graph() {
        let a = GraphGenerator::new(25).seed(99).generate().unwrap();
        let b = GraphGenerator::new(25).seed(99).generate().unwrap();
        let ea: Vec<_> = a.edges().collect();
        let eb: Vec<_> = b.edges().collect();
        assert_eq!(ea, eb);
    }

    #[test]
    fn test_people_attributes() {
        let graph = GraphGenerator::new(50).seed(5).generate().unwrap();
        for p in graph.people() {
            assert_eq!(p.identifier.len(), 6);
            assert!(p.identifier.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            assert_eq!(p.name.len(), 4);
            assert!((18..=55).contains(&p.age));
            assert!((0.0..1.0).contains(&p.severity_level));
        }
    }

    #[test]
    fn test_tiny_populations() {
        assert!(GraphGenerator::new(0).generate().unwrap().is_empty());
        let one = GraphGenerator::new(1).connected(false).generate().unwrap();
        assert_eq!((one.len(), one.edge_count()), (1, 0));
        let two = GraphGenerator::new(2).seed(1).generate().unwrap();
        assert_eq!(two.edge_count(), 1);
    }
}
