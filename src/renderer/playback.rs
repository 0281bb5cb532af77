use std::time::Duration;

/// Which frame is on screen, and whether the animation is running.
/// Playback stops on the last frame.
#[derive(Debug, Clone)]
pub struct Playback {
    frame_count: usize,
    current: usize,
    playing: bool,
    frame_duration: Duration,
    elapsed: Duration,
}

impl Playback {
    pub fn new(frame_count: usize, frame_duration: Duration) -> Self {
        Self {
            frame_count,
            current: 0,
            playing: false,
            frame_duration,
            elapsed: Duration::ZERO,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Play/pause. Playing from the last frame starts over.
    pub fn toggle(&mut self) {
        if !self.playing && self.is_at_end() {
            self.current = 0;
        }
        self.playing = !self.playing;
        self.elapsed = Duration::ZERO;
    }

    pub fn step_forward(&mut self) {
        self.playing = false;
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    pub fn step_back(&mut self) {
        self.playing = false;
        self.current = self.current.saturating_sub(1);
    }

    pub fn rewind(&mut self) {
        self.current = 0;
        self.elapsed = Duration::ZERO;
    }

    /// Advances by wall clock time. Returns `true` if the frame changed.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.playing || self.frame_duration.is_zero() {
            return false;
        }

        let before = self.current;
        self.elapsed += dt;
        while self.elapsed >= self.frame_duration && !self.is_at_end() {
            self.elapsed -= self.frame_duration;
            self.current += 1;
        }
        if self.is_at_end() {
            self.playing = false;
            self.elapsed = Duration::ZERO;
        }
        before != self.current
    }

    fn is_at_end(&self) -> bool {
        self.current + 1 >= self.frame_count
    }
}
