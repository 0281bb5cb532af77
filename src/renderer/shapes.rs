use std::f32::consts::PI;

use super::Vertex;

/// Triangle fan of `res` slices, flattened into a triangle list
pub fn circle(pos: [f32; 3], color: [f32; 4], r: f32, res: usize) -> Vec<Vertex> {
    let mut shape = Vec::with_capacity(3 * res);
    let a = 2.0 * PI / res as f32;

    for i in 0..res {
        let i = i as f32;
        shape.push(Vertex {
            position: pos,
            color,
        });
        shape.push(Vertex {
            position: [
                pos[0] + (r * f32::sin(a * i)),
                pos[1] + (r * f32::cos(a * i)),
                pos[2],
            ],
            color,
        });
        shape.push(Vertex {
            position: [
                pos[0] + (r * f32::sin(a * (i + 1.0))),
                pos[1] + (r * f32::cos(a * (i + 1.0))),
                pos[2],
            ],
            color,
        });
    }

    shape
}

pub fn line(p1: [f32; 2], p2: [f32; 2], color: [f32; 4]) -> [Vertex; 2] {
    [
        Vertex {
            position: [p1[0], p1[1], 0.0],
            color,
        },
        Vertex {
            position: [p2[0], p2[1], 0.0],
            color,
        },
    ]
}
