use std::{collections::BTreeSet, fs::File, io::BufWriter, io::Write, path::Path};

use glam::Vec2;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::{
    colouring::{ColourMapper, Rgb},
    error::Result,
    graph::ContactGraph,
};

/// What a person's colour encodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColourMode {
    /// Red when infected, white otherwise
    Infection,
    /// Faded by degrees apart from the nearest infection
    Degrees,
}

/// One person as drawn in a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexView {
    pub identifier: String,
    pub label: String,
    pub rgb: Rgb,
    /// `0xRRGGBB`
    pub colour: u32,
    pub degrees_apart: Option<u32>,
    pub infected: bool,
    pub position: [f32; 2],
}

/// Everything a renderer needs to draw one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub tick: usize,
    pub mode: ColourMode,
    pub vertices: Vec<VertexView>,
    /// Indices into `vertices`
    pub edges: Vec<(usize, usize)>,
}

impl Frame {
    /// Snapshots the graph. People without a position are placed at the origin.
    /// Degrees apart are only published while they match the infected set.
    pub fn capture(
        graph: &ContactGraph,
        tick: usize,
        mode: ColourMode,
        positions: &[Vec2],
        mapper: &mut ColourMapper,
    ) -> Self {
        let degrees_current = graph.degrees_current();
        let vertices = graph
            .people()
            .enumerate()
            .map(|(i, person)| {
                let degrees_apart = if degrees_current {
                    person.degrees_apart
                } else {
                    None
                };
                let rgb = match mode {
                    ColourMode::Infection => mapper.infection(person.infected),
                    ColourMode::Degrees => mapper.distance(degrees_apart),
                };
                VertexView {
                    identifier: person.identifier.clone(),
                    label: person.name.clone(),
                    rgb,
                    colour: rgb.packed(),
                    degrees_apart,
                    infected: person.infected,
                    position: positions.get(i).copied().unwrap_or(Vec2::ZERO).to_array(),
                }
            })
            .collect();

        let edges = graph
            .arena()
            .edge_references()
            .map(|e| (e.source().index(), e.target().index()))
            .collect();

        Self {
            tick,
            mode,
            vertices,
            edges,
        }
    }

    pub fn infected_ids(&self) -> BTreeSet<&str> {
        self.vertices
            .iter()
            .filter(|v| v.infected)
            .map(|v| v.identifier.as_str())
            .collect()
    }

    pub fn infected_count(&self) -> usize {
        self.vertices.iter().filter(|v| v.infected).count()
    }

    pub fn vertex(&self, identifier: &str) -> Option<&VertexView> {
        self.vertices.iter().find(|v| v.identifier == identifier)
    }
}

/// Writes frames as a JSON array
pub fn write_json<W: Write>(frames: &[Frame], writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, frames)?;
    Ok(())
}

pub fn export_json(frames: &[Frame], path: impl AsRef<Path>) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(frames, &mut writer)?;
    writer.flush()?;
    Ok(())
}
