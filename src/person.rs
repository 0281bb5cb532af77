use serde::{Deserialize, Serialize};

/// A person who undergoes contact tracing. One vertex of a [`ContactGraph`](crate::graph::ContactGraph).
///
/// Neighbours are not stored here; the graph owns all adjacency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub identifier: String,
    pub name: String,
    pub age: u32,
    /// How badly the person would be affected, in `[0, 1]`
    pub severity_level: f64,
    pub infected: bool,
    /// Hops to the nearest infected person. `None` if not computed or unreachable.
    pub degrees_apart: Option<u32>,
}

impl Person {
    pub fn new(identifier: String, name: String, age: u32, severity_level: f64) -> Self {
        Self {
            identifier,
            name,
            age,
            severity_level,
            infected: false,
            degrees_apart: None,
        }
    }

    pub fn reset_degree(&mut self) {
        self.degrees_apart = None;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_new_person_is_healthy_and_unlabeled() {
        let p = Person::new("WJ5751".into(), "W. J".into(), 30, 0.4);
        assert!(!p.infected);
        assert_eq!(p.degrees_apart, None);
    }

    #[test]
    fn test_reset_degree() {
        let mut p = Person::new("a".into(), "A. A".into(), 30, 0.4);
        p.degrees_apart = Some(3);
        p.reset_degree();
        assert_eq!(p.degrees_apart, None);
    }
}
