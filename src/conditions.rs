use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    generator::{ContactLevel, GraphGenerator},
};

/// Populations must be strictly larger than this
pub const MIN_POPULATION: usize = 10;
pub const MAX_POPULATION: usize = 60;

/// Whether a generated population forms one group or two isolated ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Connected,
    Partitioned,
}

impl FromStr for Connectivity {
    type Err = Error;

    /// Accepts the menu answers `yes` / `no`
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "connected" => Ok(Connectivity::Connected),
            "no" | "partitioned" => Ok(Connectivity::Partitioned),
            _ => Err(Error::UnknownConnectivity(s.to_string())),
        }
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connectivity::Connected => f.write_str("yes"),
            Connectivity::Partitioned => f.write_str("no"),
        }
    }
}

/// The four knobs a user picks before a generated simulation starts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConditions {
    pub population: usize,
    pub contact_level: ContactLevel,
    pub initial_infected: usize,
    pub connectivity: Connectivity,
}

impl SimulationConditions {
    pub fn new(
        population: usize,
        contact_level: ContactLevel,
        initial_infected: usize,
        connectivity: Connectivity,
    ) -> Result<Self> {
        let conditions = Self {
            population,
            contact_level,
            initial_infected,
            connectivity,
        };
        conditions.validate()?;
        Ok(conditions)
    }

    /// Builds conditions from the raw menu strings, e.g. `(20, "medium", 1, "yes")`
    pub fn parse(
        population: usize,
        contact_level: &str,
        initial_infected: usize,
        connectivity: &str,
    ) -> Result<Self> {
        let contact_level = contact_level
            .parse()
            .map_err(|e: Error| Error::InvalidConditions(e.to_string()))?;
        let connectivity = connectivity
            .parse()
            .map_err(|e: Error| Error::InvalidConditions(e.to_string()))?;
        Self::new(population, contact_level, initial_infected, connectivity)
    }

    pub fn validate(&self) -> Result<()> {
        if self.population <= MIN_POPULATION || self.population > MAX_POPULATION {
            return Err(Error::InvalidConditions(format!(
                "population must be in ({MIN_POPULATION}, {MAX_POPULATION}], got {}",
                self.population
            )));
        }
        if self.initial_infected == 0 || self.initial_infected > self.population {
            return Err(Error::InvalidConditions(format!(
                "initial infected must be in [1, {}], got {}",
                self.population, self.initial_infected
            )));
        }
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connectivity == Connectivity::Connected
    }

    /// Graph generator matching these conditions
    pub fn generator(&self) -> GraphGenerator {
        GraphGenerator::new(self.population)
            .contact_level(self.contact_level)
            .connected(self.is_connected())
    }
}

impl Default for SimulationConditions {
    /// The menu's starting values
    fn default() -> Self {
        Self {
            population: 20,
            contact_level: ContactLevel::Medium,
            initial_infected: 1,
            connectivity: Connectivity::Connected,
        }
    }
}
