//! Force directed placement of people for the renderer.
//!
//! People repel each other, contacts act as springs and everything is pulled
//! gently toward the origin. Positions are computed once per run so frames of
//! the same run line up. The result is scaled into `[-1, 1]` on both axes.

use glam::Vec2;
use petgraph::visit::EdgeRef;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use crate::graph::ContactGraph;

const MAX_FORCE: f32 = 100000.0;

#[derive(Debug, Clone)]
struct Particle {
    position: Vec2,
    velocity: Vec2,
    mass: f32,
    fixed: bool,
}

impl Particle {
    fn new(position: Vec2, mass: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            mass,
            fixed: false,
        }
    }
}

#[derive(Debug, Clone)]
struct Spring {
    a: usize,
    b: usize,
    stiffness: f32,
}

#[derive(Clone, Debug)]
pub struct Layout {
    repel: bool,
    spring: bool,
    gravity: bool,
    spring_stiffness: f32,
    spring_neutral_length: f32,
    delta_time: f32,
    gravity_force: f32,
    repel_force_const: f32,
    damping: f32,
    freeze_thresh: f32,
    iterations: usize,
    seed: u64,
}

impl Layout {
    pub fn builder() -> LayoutBuilder {
        LayoutBuilder::default()
    }

    /// Positions indexed like [`ContactGraph::people`]
    pub fn compute(&self, graph: &ContactGraph) -> Vec<Vec2> {
        let arena = graph.arena();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let spread = (arena.node_count() as f32).max(1.0);

        let mut particles: Vec<Particle> = arena
            .node_indices()
            .map(|idx| {
                let position = Vec2::new(rng.gen_range(-spread..=spread), rng.gen_range(-spread..=spread));
                Particle::new(position, 1.0 + arena.neighbors(idx).count() as f32)
            })
            .collect();

        // closer contacts pull harder
        let springs: Vec<Spring> = arena
            .edge_references()
            .map(|e| Spring {
                a: e.source().index(),
                b: e.target().index(),
                stiffness: self.spring_stiffness * (0.5 + *e.weight() as f32),
            })
            .collect();

        let mut steps = 0;
        while steps < self.iterations && particles.iter().any(|p| !p.fixed) {
            self.simulation_step(&mut particles, &springs);
            steps += 1;
        }
        debug!(steps, people = particles.len(), "layout settled");

        normalize(particles.into_iter().map(|p| p.position).collect())
    }

    fn simulation_step(&self, particles: &mut [Particle], springs: &[Spring]) {
        let mut forces = vec![Vec2::ZERO; particles.len()];

        for (i, p) in particles.iter().enumerate() {
            if p.fixed {
                continue;
            }
            if self.repel {
                for (j, other) in particles.iter().enumerate() {
                    if i != j {
                        forces[i] += self.repel_force(p, other);
                    }
                }
            }
            if self.gravity {
                forces[i] += -p.position * p.mass * self.gravity_force;
            }
        }

        if self.spring {
            for s in springs {
                let force = self.spring_force(&particles[s.a], &particles[s.b], s.stiffness);
                forces[s.a] -= force;
                forces[s.b] += force;
            }
        }

        for (p, force) in particles.iter_mut().zip(forces) {
            if p.fixed {
                p.velocity = Vec2::ZERO;
                continue;
            }
            p.velocity += force / p.mass * self.delta_time;
            p.velocity *= self.damping;
            p.position += p.velocity * self.delta_time;

            if self.freeze_thresh > p.velocity.length() {
                p.fixed = true;
            }
        }
    }

    fn spring_force(&self, p1: &Particle, p2: &Particle, stiffness: f32) -> Vec2 {
        let direction = p2.position - p1.position;
        let magnitude = stiffness * (direction.length() - self.spring_neutral_length);
        direction.normalize_or(Vec2::ZERO) * -magnitude
    }

    fn repel_force(&self, p1: &Particle, p2: &Particle) -> Vec2 {
        let direction = p2.position - p1.position;
        if direction.length_squared() == 0.0 {
            return Vec2::ZERO;
        }
        let f = -self.repel_force_const * (p1.mass * p2.mass).abs() / direction.length_squared();
        (direction.normalize_or(Vec2::ZERO) * f).clamp(Vec2::splat(-MAX_FORCE), Vec2::splat(MAX_FORCE))
    }
}

/// Centers the points and scales the larger side of their bounding box to `[-1, 1]`
fn normalize(mut points: Vec<Vec2>) -> Vec<Vec2> {
    if points.is_empty() {
        return points;
    }
    let min = points.iter().fold(Vec2::splat(f32::INFINITY), |m, p| m.min(*p));
    let max = points.iter().fold(Vec2::splat(f32::NEG_INFINITY), |m, p| m.max(*p));
    let center = (min + max) * 0.5;
    let half_extent = ((max - min) * 0.5).max_element();

    for p in points.iter_mut() {
        *p -= center;
        if half_extent > 0.0 {
            *p /= half_extent;
        }
    }
    points
}

/// Builder for `Layout`
pub struct LayoutBuilder {
    repel: bool,
    spring: bool,
    gravity: bool,
    spring_stiffness: f32,
    spring_neutral_length: f32,
    delta_time: f32,
    gravity_force: f32,
    repel_force_const: f32,
    damping: f32,
    freeze_thresh: f32,
    iterations: usize,
    seed: u64,
}

impl LayoutBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// If people should push each other away
    pub fn repel(mut self, repel: bool) -> Self {
        self.repel = repel;
        self
    }

    /// If contacts should act as springs and pull people together
    pub fn spring(mut self, spring: bool) -> Self {
        self.spring = spring;
        self
    }

    /// If everyone should be pulled to the center
    pub fn gravity(mut self, gravity: bool) -> Self {
        self.gravity = gravity;
        self
    }

    /// Base spring strength, scaled per contact by its level
    pub fn spring_stiffness(mut self, spring_stiffness: f32) -> Self {
        self.spring_stiffness = spring_stiffness;
        self
    }

    /// Length of a contact at rest.
    /// Shorter contacts push apart, longer ones pull together.
    pub fn spring_neutral_length(mut self, neutral_length: f32) -> Self {
        self.spring_neutral_length = neutral_length;
        self
    }

    pub fn gravity_force(mut self, gravity_force: f32) -> Self {
        self.gravity_force = gravity_force;
        self
    }

    pub fn repel_force(mut self, repel_force_const: f32) -> Self {
        self.repel_force_const = repel_force_const;
        self
    }

    /// `1.0` -> No Damping
    /// `0.0` -> No Movement
    pub fn damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Freeze people whose velocity falls below `freeze_thresh`.
    /// Set to `-1` to disable
    pub fn freeze_threshold(mut self, freeze_thresh: f32) -> Self {
        self.freeze_thresh = freeze_thresh;
        self
    }

    /// Seconds simulated per step (euler method)
    pub fn delta_time(mut self, delta_time: f32) -> Self {
        self.delta_time = delta_time;
        self
    }

    /// Upper bound on simulation steps
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Seed for the initial scatter
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Layout {
        Layout {
            repel: self.repel,
            spring: self.spring,
            gravity: self.gravity,
            spring_stiffness: self.spring_stiffness,
            spring_neutral_length: self.spring_neutral_length,
            delta_time: self.delta_time,
            gravity_force: self.gravity_force,
            repel_force_const: self.repel_force_const,
            damping: self.damping,
            freeze_thresh: self.freeze_thresh,
            iterations: self.iterations,
            seed: self.seed,
        }
    }
}

impl Default for LayoutBuilder {
    fn default() -> Self {
        Self {
            repel: true,
            spring: true,
            gravity: true,
            spring_stiffness: 10.0,
            spring_neutral_length: 2.0,
            delta_time: 0.005,
            gravity_force: 1.0,
            repel_force_const: 100.0,
            damping: 0.9,
            freeze_thresh: 1e-2,
            iterations: 2000,
            seed: 0,
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        LayoutBuilder::default().build()
    }
}
