use glam::Vec2;
use petgraph::{graph::NodeIndex, visit::EdgeRef};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::{
    colouring::ColourMapper,
    conditions::SimulationConditions,
    error::{Error, Result},
    frame::{ColourMode, Frame},
    graph::ContactGraph,
    layout::Layout,
};

/// Weeks simulated by default
pub const DEFAULT_TICKS: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    NotStarted,
    /// `tick` is the last tick whose frame was produced
    Running { tick: usize },
    Finished,
}

/// Discrete time infection spread over a [`ContactGraph`].
///
/// Each tick, every contact between an infected and a susceptible person is an
/// independent coin flip weighted by the contact level. Hits are buffered and
/// applied together once the tick is over, so a person infected during a tick
/// starts spreading on the next one. Infection is never cleared.
///
/// The simulation is an iterator of [`Frame`]s: the initial state, then one
/// frame per tick. Stopping iteration early is how a run is cancelled.
#[derive(Debug)]
pub struct Simulation {
    graph: ContactGraph,
    ticks: usize,
    with_degrees: bool,
    state: SimulationState,
    rng: StdRng,
    positions: Vec<Vec2>,
    mapper: ColourMapper,
}

impl Simulation {
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::default()
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn graph(&self) -> &ContactGraph {
        &self.graph
    }

    pub fn into_graph(self) -> ContactGraph {
        self.graph
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn with_degrees(&self) -> bool {
        self.with_degrees
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    /// Produces the next frame, or `None` once every tick has run
    pub fn step(&mut self) -> Option<Frame> {
        let tick = match self.state {
            SimulationState::NotStarted => 0,
            SimulationState::Running { tick } => {
                let newly_infected = self.transmit();
                self.graph.infect_nodes(&newly_infected);
                debug!(
                    tick = tick + 1,
                    new = newly_infected.len(),
                    total = self.graph.infected_count(),
                    "tick finished"
                );
                tick + 1
            }
            SimulationState::Finished => return None,
        };

        if self.with_degrees {
            self.graph.recalculate_degrees();
        }

        self.state = if tick >= self.ticks {
            info!(
                ticks = self.ticks,
                infected = self.graph.infected_count(),
                people = self.graph.len(),
                "simulation finished"
            );
            SimulationState::Finished
        } else {
            SimulationState::Running { tick }
        };

        Some(self.frame(tick))
    }

    /// Runs every remaining tick. A fresh simulation yields `ticks + 1` frames.
    pub fn run(&mut self) -> Vec<Frame> {
        self.by_ref().collect()
    }

    fn frame(&mut self, tick: usize) -> Frame {
        let mode = if self.with_degrees {
            ColourMode::Degrees
        } else {
            ColourMode::Infection
        };
        Frame::capture(&self.graph, tick, mode, &self.positions, &mut self.mapper)
    }

    /// Flips a coin for every infected to susceptible contact.
    /// Every contact is tried even when its target was already hit this tick.
    fn transmit(&mut self) -> Vec<NodeIndex> {
        let arena = self.graph.arena();
        let mut hit = vec![false; arena.node_count()];
        let mut newly_infected = vec![];

        for u in arena.node_indices().filter(|&i| arena[i].infected) {
            for edge in arena.edges(u) {
                let v = if edge.source() == u {
                    edge.target()
                } else {
                    edge.source()
                };
                if arena[v].infected {
                    continue;
                }
                if self.rng.gen_bool(*edge.weight()) && !hit[v.index()] {
                    hit[v.index()] = true;
                    newly_infected.push(v);
                }
            }
        }
        newly_infected
    }
}

impl Iterator for Simulation {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.step()
    }
}

/// Builder for `Simulation`
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    ticks: usize,
    with_degrees: bool,
    seed: Option<u64>,
    layout: Layout,
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ticks to run after the initial frame
    pub fn ticks(mut self, ticks: usize) -> Self {
        self.ticks = ticks;
        self
    }

    /// Recalculate degrees apart every tick and colour frames by distance
    pub fn with_degrees(mut self, with_degrees: bool) -> Self {
        self.with_degrees = with_degrees;
        self
    }

    /// Fixes the random seed. Without it the run is seeded from entropy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Simulation over an existing graph, using whoever is already infected as seeds
    pub fn build(self, graph: ContactGraph) -> Result<Simulation> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.build_with_rng(graph, rng)
    }

    /// Generates a graph matching `conditions` and infects a random selection of people
    pub fn build_from_conditions(self, conditions: &SimulationConditions) -> Result<Simulation> {
        conditions.validate()?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut graph = conditions.generator().generate_with(&mut rng)?;

        let ids: Vec<String> = graph.people().map(|p| p.identifier.clone()).collect();
        let seeds: Vec<&String> = ids
            .choose_multiple(&mut rng, conditions.initial_infected)
            .collect();
        graph.set_infected(seeds)?;

        info!(
            population = conditions.population,
            level = %conditions.contact_level,
            initial_infected = conditions.initial_infected,
            connected = conditions.is_connected(),
            "generated simulation"
        );
        self.build_with_rng(graph, rng)
    }

    fn build_with_rng(self, graph: ContactGraph, rng: StdRng) -> Result<Simulation> {
        if self.ticks == 0 {
            return Err(Error::InvalidConditions(
                "tick count must be at least 1".to_string(),
            ));
        }
        if graph.infected_count() == 0 {
            warn!("simulation starts without anyone infected");
        }

        let positions = self.layout.compute(&graph);
        Ok(Simulation {
            graph,
            ticks: self.ticks,
            with_degrees: self.with_degrees,
            state: SimulationState::NotStarted,
            rng,
            positions,
            mapper: ColourMapper::new(),
        })
    }
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self {
            ticks: DEFAULT_TICKS,
            with_degrees: false,
            seed: None,
            layout: Layout::default(),
        }
    }
}
