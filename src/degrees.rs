//! Degrees apart labeling.
//!
//! Every infected person is pushed as a distance `0` seed into one shared
//! frontier, then the frontier is expanded breadth first. Because the queue is
//! processed in non-decreasing distance order, the first time a person is
//! reached is along a shortest path to *some* infected person, so their label
//! is fixed on that first visit.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::graph::ContactGraph;

/// Resets every label, then assigns each person the minimum number of hops to an infected person.
/// People in a component without any infection keep `None`.
///
/// Returns the number of people that received a label.
pub fn label_degrees(graph: &mut ContactGraph) -> usize {
    let arena = graph.arena_mut();

    let mut frontier = VecDeque::with_capacity(arena.node_count());
    for idx in arena.node_indices() {
        let person = &mut arena[idx];
        if person.infected {
            person.degrees_apart = Some(0);
            frontier.push_back(idx);
        } else {
            person.degrees_apart = None;
        }
    }

    if frontier.is_empty() {
        warn!("no infected people, every degree left unset");
    }

    let mut labeled = frontier.len();
    while let Some(idx) = frontier.pop_front() {
        let Some(degree) = arena[idx].degrees_apart else {
            continue;
        };

        let neighbours: Vec<_> = arena.neighbors(idx).collect();
        for n in neighbours {
            let person = &mut arena[n];
            if person.degrees_apart.is_none() {
                person.degrees_apart = Some(degree + 1);
                labeled += 1;
                frontier.push_back(n);
            }
        }
    }

    graph.set_degrees_current(true);
    debug!(labeled, total = graph.len(), "degrees apart recalculated");
    labeled
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn build(ids: &[&str], edges: &[(&str, &str)]) -> ContactGraph {
        let mut g = ContactGraph::new();
        for id in ids {
            g.add_vertex(id, id, 30, 0.5);
        }
        for (a, b) in edges {
            g.add_edge(a, b, 0.5).unwrap();
        }
        g
    }

    fn labels(g: &ContactGraph) -> HashMap<String, Option<u32>> {
        g.people()
            .map(|p| (p.identifier.clone(), p.degrees_apart))
            .collect()
    }

    /// Single source BFS from every infected person, keeping the minimum
    fn brute_force(g: &ContactGraph) -> HashMap<String, Option<u32>> {
        let mut best: HashMap<String, Option<u32>> =
            g.people().map(|p| (p.identifier.clone(), None)).collect();

        for source in g.infected_ids() {
            let mut dist: HashMap<&str, u32> = HashMap::from([(source, 0)]);
            let mut queue = VecDeque::from([source]);
            while let Some(cur) = queue.pop_front() {
                for n in g.neighbours_of(cur).unwrap() {
                    if !dist.contains_key(n) {
                        dist.insert(n, dist[cur] + 1);
                        queue.push_back(n);
                    }
                }
            }
            for (id, d) in dist {
                let entry = best.get_mut(id).unwrap();
                *entry = Some(entry.map_or(d, |e| e.min(d)));
            }
        }
        best
    }

    #[test]
    fn test_line_from_one_end() {
        let mut g = build(&["a", "b", "c", "d"], &[("a", "b"), ("b", "c"), ("c", "d")]);
        g.set_infected(["a"]).unwrap();
        assert_eq!(label_degrees(&mut g), 4);
        assert_eq!(g.degree_of("a").unwrap(), Some(0));
        assert_eq!(g.degree_of("b").unwrap(), Some(1));
        assert_eq!(g.degree_of("c").unwrap(), Some(2));
        assert_eq!(g.degree_of("d").unwrap(), Some(3));
    }

    #[test]
    fn test_takes_minimum_over_sources() {
        // a - b - c - d - e, infected at both ends: c is 2 from either, d is 1 from e
        let mut g = build(
            &["a", "b", "c", "d", "e"],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e")],
        );
        g.set_infected(["a", "e"]).unwrap();
        label_degrees(&mut g);
        assert_eq!(g.degree_of("b").unwrap(), Some(1));
        assert_eq!(g.degree_of("c").unwrap(), Some(2));
        assert_eq!(g.degree_of("d").unwrap(), Some(1));
    }

    #[test]
    fn test_unreachable_component_stays_unset() {
        let mut g = build(&["a", "b", "x", "y"], &[("a", "b"), ("x", "y")]);
        g.set_infected(["a"]).unwrap();
        assert_eq!(label_degrees(&mut g), 2);
        assert_eq!(g.degree_of("x").unwrap(), None);
        assert_eq!(g.degree_of("y").unwrap(), None);
    }

    #[test]
    fn test_no_infected_leaves_all_unset() {
        let mut g = build(&["a", "b"], &[("a", "b")]);
        assert_eq!(label_degrees(&mut g), 0);
        assert!(g.people().all(|p| p.degrees_apart.is_none()));
        assert!(g.degrees_current());
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut g = build(
            &["a", "b", "c", "d", "e", "f"],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("c", "d"), ("e", "f")],
        );
        g.set_infected(["b"]).unwrap();
        label_degrees(&mut g);
        let first = labels(&g);
        label_degrees(&mut g);
        assert_eq!(first, labels(&g));
    }

    #[test]
    fn test_rerun_resets_stale_labels() {
        let mut g = build(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        g.set_infected(["a"]).unwrap();
        label_degrees(&mut g);
        assert_eq!(g.degree_of("c").unwrap(), Some(2));

        g.clear_infections();
        g.set_infected(["c"]).unwrap();
        label_degrees(&mut g);
        assert_eq!(g.degree_of("a").unwrap(), Some(2));
        assert_eq!(g.degree_of("c").unwrap(), Some(0));
    }

    #[test]
    fn test_matches_brute_force_on_fixed_graphs() {
        let cases: Vec<(Vec<&str>, Vec<(&str, &str)>, Vec<&str>)> = vec![
            // ring of six with a chord
            (
                vec!["0", "1", "2", "3", "4", "5"],
                vec![("0", "1"), ("1", "2"), ("2", "3"), ("3", "4"), ("4", "5"), ("5", "0"), ("1", "4")],
                vec!["0"],
            ),
            // star with a tail, two seeds
            (
                vec!["h", "s1", "s2", "s3", "t1", "t2", "t3"],
                vec![("h", "s1"), ("h", "s2"), ("h", "s3"), ("s3", "t1"), ("t1", "t2"), ("t2", "t3")],
                vec!["s1", "t3"],
            ),
            // grid 3x3 with an isolated pair
            (
                vec!["00", "01", "02", "10", "11", "12", "20", "21", "22", "q", "r"],
                vec![
                    ("00", "01"), ("01", "02"), ("10", "11"), ("11", "12"), ("20", "21"), ("21", "22"),
                    ("00", "10"), ("10", "20"), ("01", "11"), ("11", "21"), ("02", "12"), ("12", "22"),
                    ("q", "r"),
                ],
                vec!["00", "22"],
            ),
        ];

        for (ids, edges, seeds) in cases {
            let mut g = build(&ids, &edges);
            g.set_infected(seeds).unwrap();
            label_degrees(&mut g);
            assert_eq!(labels(&g), brute_force(&g));
        }
    }
}
