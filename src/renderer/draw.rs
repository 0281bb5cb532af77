use glium::{
    glutin::surface::WindowSurface, implement_vertex, uniforms::Uniforms, Display,
    DrawParameters, Frame as GlFrame, Program, Surface,
};

use super::{shapes, Vertex};
use crate::{
    error::{Error, Result},
    frame::Frame,
};

const EDGE_COLOR: [f32; 4] = [0.55, 0.55, 0.6, 1.0];
const PERSON_RADIUS: f32 = 0.04;
const CIRCLE_RESOLUTION: usize = 24;

static VERTEX_SHADER_SRC: &str = r#"
#version 140

in vec3 position;
in vec4 color;
out vec4 vertex_color;

uniform mat4 matrix;

void main() {
    vertex_color = color;
    gl_Position = matrix * vec4(position, 1.0);
}
"#;

static INSTANCE_SHADER_SRC: &str = r#"
#version 140

in vec3 position;
in vec3 color_attr;
in vec3 world_position;
in float scale;

out vec4 vertex_color;

uniform mat4 matrix;

void main() {
    vertex_color = vec4(color_attr, 1.0);
    gl_Position = matrix * vec4((position * scale) + world_position, 1.0);
}
"#;

static FRAGMENT_SHADER_SRC: &str = r#"
#version 140

in vec4 vertex_color;
out vec4 color;

void main() {
    color = vertex_color;
}
"#;

/// Per person instance data
#[derive(Copy, Clone)]
struct Attr {
    color_attr: [f32; 3],
    world_position: [f32; 3],
    scale: f32,
}
implement_vertex!(Attr, color_attr, world_position, scale);

/// Compiled shader programs, built once per window
pub struct Programs {
    lines: Program,
    people: Program,
}

impl Programs {
    pub fn new(display: &Display<WindowSurface>) -> Result<Self> {
        let lines = Program::from_source(display, VERTEX_SHADER_SRC, FRAGMENT_SHADER_SRC, None)
            .map_err(Error::render)?;
        let people = Program::from_source(display, INSTANCE_SHADER_SRC, FRAGMENT_SHADER_SRC, None)
            .map_err(Error::render)?;
        Ok(Self { lines, people })
    }
}

pub fn draw_edges<U: Uniforms>(
    frame: &Frame,
    target: &mut GlFrame,
    display: &Display<WindowSurface>,
    programs: &Programs,
    uniforms: &U,
    params: &DrawParameters,
) -> Result<()> {
    if frame.edges.is_empty() {
        return Ok(());
    }

    let shape: Vec<Vertex> = frame
        .edges
        .iter()
        .filter_map(|&(a, b)| Some((frame.vertices.get(a)?, frame.vertices.get(b)?)))
        .flat_map(|(a, b)| shapes::line(a.position, b.position, EDGE_COLOR))
        .collect();

    let vertex_buffer = glium::VertexBuffer::new(display, &shape).map_err(Error::render)?;
    let indices = glium::index::NoIndices(glium::index::PrimitiveType::LinesList);

    target
        .draw(&vertex_buffer, indices, &programs.lines, uniforms, params)
        .map_err(Error::render)
}

pub fn draw_people<U: Uniforms>(
    frame: &Frame,
    target: &mut GlFrame,
    display: &Display<WindowSurface>,
    programs: &Programs,
    uniforms: &U,
    params: &DrawParameters,
) -> Result<()> {
    if frame.vertices.is_empty() {
        return Ok(());
    }

    let shape = shapes::circle([0.0, 0.0, 0.0], [0.0; 4], 1.0, CIRCLE_RESOLUTION);

    let attr_list: Vec<Attr> = frame
        .vertices
        .iter()
        .map(|v| Attr {
            color_attr: v.rgb.to_unit(),
            world_position: [v.position[0], v.position[1], 0.0],
            scale: PERSON_RADIUS,
        })
        .collect();

    let vertex_buffer = glium::VertexBuffer::new(display, &shape).map_err(Error::render)?;
    let instance_buffer =
        glium::vertex::VertexBuffer::dynamic(display, &attr_list).map_err(Error::render)?;
    let per_instance = instance_buffer
        .per_instance()
        .map_err(|_| Error::Render("instanced drawing is not supported".to_string()))?;
    let indices = glium::index::NoIndices(glium::index::PrimitiveType::TrianglesList);

    target
        .draw(
            (&vertex_buffer, per_instance),
            indices,
            &programs.people,
            uniforms,
            params,
        )
        .map_err(Error::render)
}
