//! Infection spread over a weighted contact graph.
//!
//! # Example
//! ```rust
//! use contact_grapher::{ContactGraph, Simulation};
//!
//! let mut graph = ContactGraph::new();
//! graph.add_vertex("A", "Ann", 30, 0.2);
//! graph.add_vertex("B", "Bob", 41, 0.7);
//! graph.add_vertex("C", "Cat", 25, 0.1);
//! graph.add_edge("A", "B", 1.0).unwrap();
//! graph.add_edge("B", "C", 0.0).unwrap();
//! graph.set_infected(["A"]).unwrap();
//!
//! let mut simulation = Simulation::builder().ticks(3).seed(7).build(graph).unwrap();
//! let frames = simulation.run();
//! assert_eq!(frames.len(), 4);
//! assert!(simulation.graph().person("B").unwrap().infected);
//! assert!(!simulation.graph().person("C").unwrap().infected);
//! ```
//!
//! Frames can be handed to [`renderer::Renderer`] to be animated in a window.

pub mod colouring;
pub mod conditions;
pub mod degrees;
pub mod error;
pub mod frame;
pub mod generator;
pub mod graph;
pub mod layout;
pub mod loader;
pub mod person;
pub mod renderer;
pub mod simulation;

pub use error::{Error, Result};
pub use frame::{ColourMode, Frame};
pub use graph::ContactGraph;
pub use person::Person;
pub use simulation::{Simulation, SimulationBuilder};
