use contact_grapher::{
    colouring::ColourMapper, layout::Layout, loader, renderer::Renderer, ColourMode, Frame,
};

fn main() -> contact_grapher::Result<()> {
    // Load the sample population
    let mut graph = loader::load_graph_csv("data/persons.csv", "data/connections.csv")?;

    // Label everyone by distance from the first case
    graph.set_infected(["WJ5751"])?;
    graph.recalculate_degrees();

    let positions = Layout::builder().seed(1).build().compute(&graph);
    let frame = Frame::capture(&graph, 0, ColourMode::Degrees, &positions, &mut ColourMapper::new());

    Renderer::new(vec![frame]).title("Degrees apart").create_window()
}
