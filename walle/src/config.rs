/// Default side length of the canvas.
pub const DEFAULT_CANVAS_SIZE: usize = 20;

/// Knobs for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub canvas_size: usize,
    /// Abort after this many executed statements. `None` runs unbounded.
    pub max_steps: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            max_steps: None,
        }
    }
}

impl RunConfig {
    pub fn with_canvas_size(mut self, size: usize) -> Self {
        self.canvas_size = size;
        self
    }

    pub fn with_max_steps(mut self, limit: Option<u64>) -> Self {
        self.max_steps = limit;
        self
    }
}
