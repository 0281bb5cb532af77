use contact_grapher::{
    conditions::{Connectivity, SimulationConditions},
    generator::ContactLevel,
    Simulation,
};

fn main() -> contact_grapher::Result<()> {
    let conditions = SimulationConditions::new(50, ContactLevel::Low, 3, Connectivity::Partitioned)?;

    // Configure the simulation
    let simulation = Simulation::builder()
        .ticks(30)
        .with_degrees(true)
        .seed(2021)
        .build_from_conditions(&conditions)?;

    // Frames are produced lazily, one per week
    for frame in simulation {
        let unreachable = frame.vertices.iter().filter(|v| v.degrees_apart.is_none()).count();
        println!(
            "week {:>2}: {:>2} infected, {:>2} out of reach",
            frame.tick,
            frame.infected_count(),
            unreachable
        );
    }
    Ok(())
}
