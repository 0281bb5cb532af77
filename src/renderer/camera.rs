use glam::{Mat4, Vec2};

const MIN_ZOOM: f32 = 0.1;
const MAX_ZOOM: f32 = 20.0;
/// Extra room around a `[-1, 1]` layout
const MARGIN: f32 = 1.2;

/// Orthographic 2D camera over the layout plane
pub struct Camera {
    pub center: Vec2,
    pub zoom: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            center: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    /// Multiplies the zoom, clamped to a sane range
    pub fn zoom_by(&mut self, factor: f32) {
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Moves the camera by `delta` in screen-sized units, so panning feels the same at every zoom
    pub fn pan(&mut self, delta: Vec2) {
        self.center += delta / self.zoom;
    }

    /// Centers on the average of `points` and resets the zoom
    pub fn recenter(&mut self, points: impl IntoIterator<Item = Vec2>) {
        let (sum, count) = points
            .into_iter()
            .fold((Vec2::ZERO, 0), |(sum, count), p| (sum + p, count + 1));
        if count > 0 {
            self.center = sum / count as f32;
        }
        self.zoom = 1.0;
    }

    pub fn matrix(&self, aspect_ratio: f32) -> Mat4 {
        let half_height = MARGIN / self.zoom;
        let half_width = half_height * aspect_ratio;
        Mat4::orthographic_rh_gl(
            self.center.x - half_width,
            self.center.x + half_width,
            self.center.y - half_height,
            self.center.y + half_height,
            -1.0,
            1.0,
        )
    }
}
