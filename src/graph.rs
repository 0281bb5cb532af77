use std::collections::{BTreeSet, HashMap};

use petgraph::{
    graph::{IndexType, NodeIndex, UnGraph},
    visit::EdgeRef,
    EdgeType,
};
use tracing::debug;

use crate::{
    error::{Error, Result},
    person::Person,
};

/// A weighted undirected graph of people.
/// Edge weights are the level of contact between two people, read as a per tick
/// transmission probability.
///
/// People live in a petgraph arena and are looked up through an identifier index,
/// so adjacency never holds references to other `Person` records.
#[derive(Debug, Clone)]
pub struct ContactGraph {
    graph: UnGraph<Person, f64>,
    index: HashMap<String, NodeIndex>,
    degrees_current: bool,
}

impl ContactGraph {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            index: HashMap::new(),
            degrees_current: false,
        }
    }

    /// Builds a graph with the shape of any petgraph topology.
    /// Nodes become people named `p{index}`, every edge gets the same `contact_level`.
    /// Self loops are skipped.
    pub fn from_topology<N, E, Ty, Ix>(
        topology: &petgraph::Graph<N, E, Ty, Ix>,
        contact_level: f64,
    ) -> Result<Self>
    where
        Ty: EdgeType,
        Ix: IndexType,
    {
        let mut graph = Self::new();
        for node in topology.node_indices() {
            let id = format!("p{}", node.index());
            graph.add_vertex(&id, &id, 0, 0.0);
        }
        for edge in topology.edge_references() {
            let (s, t) = (edge.source().index(), edge.target().index());
            if s != t {
                graph.add_edge(&format!("p{s}"), &format!("p{t}"), contact_level)?;
            }
        }
        Ok(graph)
    }

    /// Adds a person if `identifier` is not taken yet. Adding an existing identifier is a no-op.
    pub fn add_vertex(
        &mut self,
        identifier: &str,
        name: &str,
        age: u32,
        severity_level: f64,
    ) -> NodeIndex {
        if let Some(&idx) = self.index.get(identifier) {
            return idx;
        }
        let idx = self.graph.add_node(Person::new(
            identifier.to_string(),
            name.to_string(),
            age,
            severity_level,
        ));
        self.index.insert(identifier.to_string(), idx);
        idx
    }

    /// Connects two people with the given level of contact.
    /// An existing edge between them has its weight replaced.
    pub fn add_edge(&mut self, identifier1: &str, identifier2: &str, contact_level: f64) -> Result<()> {
        let a = self.node(identifier1)?;
        let b = self.node(identifier2)?;

        if a == b {
            return Err(Error::SelfContact {
                id: identifier1.to_string(),
            });
        }
        if !(0.0..=1.0).contains(&contact_level) {
            return Err(Error::InvalidContactLevel {
                weight: contact_level,
            });
        }

        self.graph.update_edge(a, b, contact_level);
        Ok(())
    }

    /// Returns the level of contact between two people, `0.0` if they are not adjacent
    pub fn get_contact_level(&self, identifier1: &str, identifier2: &str) -> f64 {
        let (Some(&a), Some(&b)) = (self.index.get(identifier1), self.index.get(identifier2)) else {
            return 0.0;
        };
        self.graph
            .find_edge(a, b)
            .and_then(|e| self.graph.edge_weight(e))
            .copied()
            .unwrap_or(0.0)
    }

    /// Marks every given person as infected.
    /// All identifiers are checked before any flag changes, so an unknown one leaves the graph untouched.
    pub fn set_infected<I, S>(&mut self, identifiers: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let nodes = identifiers
            .into_iter()
            .map(|id| self.node(id.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        for idx in nodes {
            self.graph[idx].infected = true;
        }
        self.degrees_current = false;
        Ok(())
    }

    /// Clears every infection and computed degree
    pub fn clear_infections(&mut self) {
        for person in self.graph.node_weights_mut() {
            person.infected = false;
            person.reset_degree();
        }
        self.degrees_current = false;
    }

    pub fn neighbours_of(&self, identifier: &str) -> Result<BTreeSet<&str>> {
        let idx = self.node(identifier)?;
        Ok(self
            .graph
            .neighbors(idx)
            .map(|n| self.graph[n].identifier.as_str())
            .collect())
    }

    /// Neighbours of a person together with their level of contact
    pub fn neighbour_weights(&self, identifier: &str) -> Result<Vec<(&str, f64)>> {
        let idx = self.node(identifier)?;
        Ok(self
            .graph
            .edges(idx)
            .map(|e| {
                let other = if e.source() == idx { e.target() } else { e.source() };
                (self.graph[other].identifier.as_str(), *e.weight())
            })
            .collect())
    }

    pub fn person(&self, identifier: &str) -> Option<&Person> {
        self.index.get(identifier).map(|&idx| &self.graph[idx])
    }

    /// All people in insertion order
    pub fn people(&self) -> impl Iterator<Item = &Person> {
        self.graph.node_weights()
    }

    pub fn names(&self) -> BTreeSet<&str> {
        self.people().map(|p| p.name.as_str()).collect()
    }

    /// Every contact once, as `(identifier1, identifier2, contact_level)`
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.graph.edge_references().map(|e| {
            (
                self.graph[e.source()].identifier.as_str(),
                self.graph[e.target()].identifier.as_str(),
                *e.weight(),
            )
        })
    }

    pub fn infected_ids(&self) -> Vec<&str> {
        self.people()
            .filter(|p| p.infected)
            .map(|p| p.identifier.as_str())
            .collect()
    }

    pub fn infected_count(&self) -> usize {
        self.people().filter(|p| p.infected).count()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Recomputes degrees apart for every person from the current infected set
    pub fn recalculate_degrees(&mut self) -> usize {
        crate::degrees::label_degrees(self)
    }

    /// Returns the degrees apart of a person.
    /// `Ok(None)` means the person cannot reach anyone infected.
    pub fn degree_of(&self, identifier: &str) -> Result<Option<u32>> {
        let idx = self.node(identifier)?;
        if !self.degrees_current {
            return Err(Error::DegreeNotComputed {
                id: identifier.to_string(),
            });
        }
        Ok(self.graph[idx].degrees_apart)
    }

    pub fn degrees_current(&self) -> bool {
        self.degrees_current
    }

    pub(crate) fn arena(&self) -> &UnGraph<Person, f64> {
        &self.graph
    }

    pub(crate) fn arena_mut(&mut self) -> &mut UnGraph<Person, f64> {
        &mut self.graph
    }

    pub(crate) fn set_degrees_current(&mut self, current: bool) {
        self.degrees_current = current;
    }

    /// Infects people by arena index. Used by the simulator at the end of a tick.
    pub(crate) fn infect_nodes(&mut self, nodes: &[NodeIndex]) {
        for &idx in nodes {
            self.graph[idx].infected = true;
        }
        if !nodes.is_empty() {
            debug!(count = nodes.len(), "applied new infections");
            self.degrees_current = false;
        }
    }

    fn node(&self, identifier: &str) -> Result<NodeIndex> {
        self.index
            .get(identifier)
            .copied()
            .ok_or_else(|| Error::unknown_vertex(identifier))
    }
}

impl Default for ContactGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn triangle() -> ContactGraph {
        let mut g = ContactGraph::new();
        g.add_vertex("a", "A. A", 20, 0.1);
        g.add_vertex("b", "B. B", 30, 0.2);
        g.add_vertex("c", "C. C", 40, 0.3);
        g.add_edge("a", "b", 0.5).unwrap();
        g.add_edge("b", "c", 0.25).unwrap();
        g
    }

    #[test]
    fn test_add_vertex_twice_is_noop() {
        let mut g = ContactGraph::new();
        let first = g.add_vertex("a", "Alice", 20, 0.1);
        let second = g.add_vertex("a", "Other", 99, 0.9);
        assert_eq!(first, second);
        assert_eq!(g.len(), 1);
        assert_eq!(g.person("a").unwrap().name, "Alice");
    }

    #[test]
    fn test_edge_is_symmetric() {
        let g = triangle();
        assert_eq!(g.get_contact_level("a", "b"), 0.5);
        assert_eq!(g.get_contact_level("b", "a"), 0.5);
        assert_eq!(g.get_contact_level("c", "b"), 0.25);
    }

    #[test]
    fn test_readding_edge_replaces_weight() {
        let mut g = triangle();
        g.add_edge("b", "a", 0.9).unwrap();
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.get_contact_level("a", "b"), 0.9);
    }

    #[test]
    fn test_non_adjacent_contact_level_is_zero() {
        let g = triangle();
        assert_eq!(g.get_contact_level("a", "c"), 0.0);
        assert_eq!(g.get_contact_level("a", "nobody"), 0.0);
    }

    #[test]
    fn test_add_edge_unknown_vertex() {
        let mut g = ContactGraph::new();
        let err = g.add_edge("X", "Y", 0.5).unwrap_err();
        assert!(matches!(err, Error::UnknownVertex { ref id } if id == "X"));

        let mut g = triangle();
        let err = g.add_edge("a", "Y", 0.5).unwrap_err();
        assert!(matches!(err, Error::UnknownVertex { ref id } if id == "Y"));
    }

    #[test]
    fn test_add_edge_rejects_self_contact_and_bad_weight() {
        let mut g = triangle();
        assert!(matches!(
            g.add_edge("a", "a", 0.5),
            Err(Error::SelfContact { .. })
        ));
        assert!(matches!(
            g.add_edge("a", "c", 1.5),
            Err(Error::InvalidContactLevel { .. })
        ));
        assert!(matches!(
            g.add_edge("a", "c", f64::NAN),
            Err(Error::InvalidContactLevel { .. })
        ));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_neighbours_of() {
        let g = triangle();
        let n: Vec<_> = g.neighbours_of("b").unwrap().into_iter().collect();
        assert_eq!(n, vec!["a", "c"]);
        assert!(g.neighbours_of("a").unwrap().contains("b"));
        assert!(g.neighbours_of("zz").is_err());

        let mut w = g.neighbour_weights("b").unwrap();
        w.sort_by(|x, y| x.0.cmp(y.0));
        assert_eq!(w, vec![("a", 0.5), ("c", 0.25)]);
    }

    #[test]
    fn test_set_infected_unknown_leaves_graph_untouched() {
        let mut g = triangle();
        let err = g.set_infected(["a", "ghost"]).unwrap_err();
        assert!(matches!(err, Error::UnknownVertex { .. }));
        assert_eq!(g.infected_count(), 0);

        g.set_infected(["a", "c"]).unwrap();
        assert_eq!(g.infected_ids(), vec!["a", "c"]);
    }

    #[test]
    fn test_degree_before_labeling_is_an_error() {
        let mut g = triangle();
        g.set_infected(["a"]).unwrap();
        assert!(matches!(
            g.degree_of("c"),
            Err(Error::DegreeNotComputed { .. })
        ));
        g.recalculate_degrees();
        assert_eq!(g.degree_of("c").unwrap(), Some(2));

        g.set_infected(["c"]).unwrap();
        assert!(matches!(
            g.degree_of("c"),
            Err(Error::DegreeNotComputed { .. })
        ));
    }

    #[test]
    fn test_clear_infections() {
        let mut g = triangle();
        g.set_infected(["b"]).unwrap();
        g.recalculate_degrees();
        g.clear_infections();
        assert_eq!(g.infected_count(), 0);
        assert!(g.people().all(|p| p.degrees_apart.is_none()));
        assert!(!g.degrees_current());
    }

    #[test]
    fn test_edges_listed_once() {
        let g = triangle();
        let edges: Vec<_> = g.edges().collect();
        assert_eq!(edges, vec![("a", "b", 0.5), ("b", "c", 0.25)]);
    }

    #[test]
    fn test_from_topology() {
        let mut topology = petgraph::Graph::<(), ()>::new();
        let n0 = topology.add_node(());
        let n1 = topology.add_node(());
        let n2 = topology.add_node(());
        topology.add_edge(n0, n1, ());
        topology.add_edge(n1, n2, ());
        topology.add_edge(n2, n2, ());

        let g = ContactGraph::from_topology(&topology, 0.3).unwrap();
        assert_eq!(g.len(), 3);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.get_contact_level("p1", "p0"), 0.3);
    }
}
