//! Playback window for simulation frames.
//!
//! Controls: `Space` play/pause, `Left`/`Right` step, `R` rewind,
//! `W`/`A`/`S`/`D` pan, mouse wheel zoom, `Return` recenter.

use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use glam::Vec2;
use glium::{glutin::surface::WindowSurface, implement_vertex, uniform, Display, Surface};
use tracing::{error, info};
use winit::{
    event::{ElementState, Event, MouseScrollDelta, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::Window,
};

use crate::{
    error::{Error, Result},
    frame::Frame,
};
use camera::Camera;
use draw::Programs;
pub use playback::Playback;

mod camera;
mod draw;
mod playback;
mod shapes;

const SCROLL_SENSITIVITY: f32 = 1.1;
const CAMERA_MOVEMENT_SENSITIVITY: f32 = 1.5;
const REDRAW_INTERVAL: Duration = Duration::from_millis(34);
pub const DEFAULT_FRAME_DURATION: Duration = Duration::from_millis(700);

#[derive(Copy, Clone, Debug)]
pub(crate) struct Vertex {
    position: [f32; 3],
    color: [f32; 4],
}
implement_vertex!(Vertex, position, color);

/// Animates a sequence of [`Frame`]s in a window
pub struct Renderer {
    frames: Vec<Frame>,
    frame_duration: Duration,
    title: String,
}

impl Renderer {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            frame_duration: DEFAULT_FRAME_DURATION,
            title: "Contact Grapher".to_string(),
        }
    }

    /// How long each frame stays on screen while playing
    pub fn frame_duration(mut self, frame_duration: Duration) -> Self {
        self.frame_duration = frame_duration;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Opens the window and blocks until it is closed
    pub fn create_window(self) -> Result<()> {
        if self.frames.is_empty() {
            return Err(Error::Render("nothing to draw".to_string()));
        }

        let event_loop = winit::event_loop::EventLoopBuilder::new().build();
        let (window, display) = glium::backend::glutin::SimpleWindowBuilder::new()
            .with_title(&self.title)
            .build(&event_loop);
        let programs = Programs::new(&display)?;

        info!(frames = self.frames.len(), "opening playback window");
        self.run_render_loop(event_loop, display, window, programs)
    }

    fn run_render_loop(
        self,
        event_loop: EventLoop<()>,
        display: Display<WindowSurface>,
        window: Window,
        programs: Programs,
    ) -> ! {
        let mut last_redraw = Instant::now();
        let mut last_event_cycle = Instant::now();

        let mut camera = Camera::new();
        let mut playback = Playback::new(self.frames.len(), self.frame_duration);
        let mut keys_held = HashSet::new();
        let mut shown = usize::MAX;

        event_loop.run(move |event, _, control_flow| {
            *control_flow = ControlFlow::Poll;

            let dt = last_event_cycle.elapsed();
            last_event_cycle = Instant::now();

            #[allow(clippy::single_match)]
            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::MouseWheel {
                        delta: MouseScrollDelta::LineDelta(_, y),
                        ..
                    } => {
                        if y > 0.0 {
                            camera.zoom_by(SCROLL_SENSITIVITY);
                        } else if y < 0.0 {
                            camera.zoom_by(1.0 / SCROLL_SENSITIVITY);
                        }
                    }

                    WindowEvent::KeyboardInput {
                        input:
                            winit::event::KeyboardInput {
                                virtual_keycode: Some(keycode),
                                state,
                                ..
                            },
                        ..
                    } => {
                        match state {
                            // key repeat sends more presses; only the first one counts
                            ElementState::Pressed if keys_held.insert(keycode) => match keycode {
                                VirtualKeyCode::Space => playback.toggle(),
                                VirtualKeyCode::Right => playback.step_forward(),
                                VirtualKeyCode::Left => playback.step_back(),
                                VirtualKeyCode::R => playback.rewind(),
                                VirtualKeyCode::Return => {
                                    let frame = &self.frames[playback.current()];
                                    camera.recenter(
                                        frame.vertices.iter().map(|v| Vec2::from_array(v.position)),
                                    );
                                }
                                _ => (),
                            },
                            ElementState::Pressed => (),
                            ElementState::Released => {
                                keys_held.remove(&keycode);
                            }
                        }
                    }
                    _ => (),
                },
                _ => (),
            }

            let step = CAMERA_MOVEMENT_SENSITIVITY * dt.as_secs_f32();
            let mut pan = Vec2::ZERO;
            if keys_held.contains(&VirtualKeyCode::W) {
                pan.y += step;
            }
            if keys_held.contains(&VirtualKeyCode::S) {
                pan.y -= step;
            }
            if keys_held.contains(&VirtualKeyCode::A) {
                pan.x -= step;
            }
            if keys_held.contains(&VirtualKeyCode::D) {
                pan.x += step;
            }
            camera.pan(pan);

            playback.advance(dt);

            if shown != playback.current() {
                shown = playback.current();
                window.set_title(&format!(
                    "{} - week {} of {}",
                    self.title,
                    self.frames[shown].tick,
                    self.frames.len() - 1
                ));
            }

            if last_redraw.elapsed() >= REDRAW_INTERVAL {
                last_redraw = Instant::now();

                if let Err(e) = draw_frame(&self.frames[shown], &display, &programs, &camera) {
                    error!(error = %e, "failed to draw frame");
                    *control_flow = ControlFlow::Exit;
                }
            }
        })
    }
}

fn draw_frame(
    frame: &Frame,
    display: &Display<WindowSurface>,
    programs: &Programs,
    camera: &Camera,
) -> Result<()> {
    let mut target = display.draw();
    target.clear_color(0.08, 0.08, 0.1, 1.0);

    let (width, height) = target.get_dimensions();
    let aspect_ratio = width as f32 / height.max(1) as f32;
    let uniforms = uniform! {
        matrix: camera.matrix(aspect_ratio).to_cols_array_2d(),
    };
    let params = glium::DrawParameters::default();

    let drawn = draw::draw_edges(frame, &mut target, display, programs, &uniforms, &params)
        .and_then(|_| draw::draw_people(frame, &mut target, display, programs, &uniforms, &params));

    // the target must be finished even when drawing failed
    let finished = target.finish().map_err(Error::render);
    drawn.and(finished)
}
