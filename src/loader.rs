//! Loading contact graphs from CSV.
//!
//! Two tables are read, each with a header row:
//! - people: `identifier, name, age, severity`
//! - contacts: `id1, id2, weight`
//!
//! Columns are matched by position, so header names are free-form.

use std::{fs::File, io::Read, path::Path};

use serde::Deserialize;
use tracing::info;

use crate::{error::Result, graph::ContactGraph};

#[derive(Debug, Clone, Deserialize)]
struct PersonRecord {
    identifier: String,
    name: String,
    age: u32,
    severity: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct ContactRecord {
    id1: String,
    id2: String,
    weight: f64,
}

/// Loads a graph from a people file and a contacts file
pub fn load_graph_csv(people_path: impl AsRef<Path>, contacts_path: impl AsRef<Path>) -> Result<ContactGraph> {
    let (people_path, contacts_path) = (people_path.as_ref(), contacts_path.as_ref());
    let graph = load_graph_from_readers(File::open(people_path)?, File::open(contacts_path)?)?;
    info!(
        people = graph.len(),
        contacts = graph.edge_count(),
        people_file = %people_path.display(),
        contacts_file = %contacts_path.display(),
        "loaded contact graph"
    );
    Ok(graph)
}

/// Same as [`load_graph_csv`] for in-memory or other non-file sources
pub fn load_graph_from_readers<P: Read, C: Read>(people: P, contacts: C) -> Result<ContactGraph> {
    let mut graph = ContactGraph::new();

    for record in reader(people).records() {
        let PersonRecord {
            identifier,
            name,
            age,
            severity,
        } = record?.deserialize(None)?;
        graph.add_vertex(&identifier, &name, age, severity);
    }

    for record in reader(contacts).records() {
        let ContactRecord { id1, id2, weight } = record?.deserialize(None)?;
        graph.add_edge(&id1, &id2, weight)?;
    }

    Ok(graph)
}

fn reader<R: Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;

    const PEOPLE: &str = "\
identifier,name,age,severity
WJ5751,W. J,34,0.2
KQ1200,K. Q,51,0.9
ZZ0001,Z. Z,19,0.05
";

    const CONTACTS: &str = "\
id1,id2,weight
WJ5751,KQ1200,0.8
KQ1200,ZZ0001,0.3
";

    #[test]
    fn test_load_from_readers() {
        let graph = load_graph_from_readers(PEOPLE.as_bytes(), CONTACTS.as_bytes()).unwrap();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.get_contact_level("KQ1200", "WJ5751"), 0.8);

        let p = graph.person("ZZ0001").unwrap();
        assert_eq!((p.name.as_str(), p.age, p.severity_level), ("Z. Z", 19, 0.05));
    }

    #[test]
    fn test_header_names_are_not_checked() {
        let people = "a,b,c,d\nx,X,1,0.5\ny,Y,2,0.5\n";
        let contacts = "from,to,w\nx,y,0.5\n";
        let graph = load_graph_from_readers(people.as_bytes(), contacts.as_bytes()).unwrap();
        assert_eq!(graph.get_contact_level("y", "x"), 0.5);
    }

    #[test]
    fn test_malformed_age() {
        let people = "identifier,name,age,severity\nx,X,old,0.5\n";
        let err = load_graph_from_readers(people.as_bytes(), "id1,id2,weight\n".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }

    #[test]
    fn test_contact_with_unknown_person() {
        let contacts = "id1,id2,weight\nWJ5751,NOPE00,0.5\n";
        let err = load_graph_from_readers(PEOPLE.as_bytes(), contacts.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::UnknownVertex { ref id } if id == "NOPE00"));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_graph_csv("does/not/exist.csv", "nope.csv"),
            Err(Error::Io(_))
        ));
    }
}
