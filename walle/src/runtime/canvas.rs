use std::collections::VecDeque;
use std::fmt;

/// Color code stored in a canvas cell. `BLANK` means nothing was painted.
pub type ColorCode = u32;

pub const BLANK: ColorCode = 0;

/// Square N×N grid of color codes. The size never changes after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    size: usize,
    // Пиксели построчно: индекс = y * size + x
    pixels: Vec<ColorCode>,
}

impl Canvas {
    pub fn new(size: usize) -> Self {
        Canvas {
            size,
            pixels: vec![BLANK; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.size && y < self.size).then(|| y * self.size + x)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    /// `None` outside the canvas.
    pub fn get(&self, x: i32, y: i32) -> Option<ColorCode> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Out-of-bounds writes are ignored; returns whether the cell exists.
    pub fn set(&mut self, x: i32, y: i32, color: ColorCode) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.pixels[i] = color;
                true
            }
            None => false,
        }
    }

    /// Sets every cell of the inclusive box `(x0, y0)..=(x1, y1)` that lies on
    /// the canvas. Work is bounded by the canvas, not by the box.
    pub fn fill_box(&mut self, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: ColorCode) -> usize {
        let last = self.size as i64 - 1;
        let (x0, x1) = (x0.max(0), x1.min(last));
        let (y0, y1) = (y0.max(0), y1.min(last));
        if x0 > x1 || y0 > y1 {
            return 0;
        }

        let (x0, x1) = (x0 as usize, x1 as usize);
        for y in y0 as usize..=y1 as usize {
            let row = y * self.size;
            self.pixels[row + x0..=row + x1].fill(color);
        }
        (x1 - x0 + 1) * (y1 - y0 + 1) as usize
    }

    /// Rows from top (`y = 0`) to bottom, each indexed by `x`.
    pub fn rows(&self) -> impl Iterator<Item = &[ColorCode]> {
        self.pixels.chunks(self.size.max(1))
    }

    pub fn painted_cells(&self) -> usize {
        self.pixels.iter().filter(|&&c| c != BLANK).count()
    }

    /// Replaces the 4-connected region of `x, y`'s color with `replacement`,
    /// breadth first. Returns how many cells changed.
    pub fn flood_fill(&mut self, x: i32, y: i32, replacement: ColorCode) -> usize {
        let Some(target) = self.get(x, y) else {
            return 0;
        };
        if target == replacement {
            return 0;
        }

        let mut queue = VecDeque::new();
        self.set(x, y, replacement);
        queue.push_back((x, y));
        let mut changed = 1;

        while let Some((cx, cy)) = queue.pop_front() {
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let (nx, ny) = (cx + dx, cy + dy);
                if self.get(nx, ny) == Some(target) {
                    self.set(nx, ny, replacement);
                    queue.push_back((nx, ny));
                    changed += 1;
                }
            }
        }

        changed
    }
}

/// Framed view: `#` for painted cells, `.` for blank ones.
impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "┌{}┐", "─".repeat(self.size))?;

        for row in self.rows().take(self.size) {
            f.write_str("│")?;
            for &cell in row {
                f.write_str(if cell == BLANK { "." } else { "#" })?;
            }
            writeln!(f, "│")?;
        }

        write!(f, "└{}┘", "─".repeat(self.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_canvas_is_blank() {
        let canvas = Canvas::new(4);
        assert_eq!(canvas.size(), 4);
        assert_eq!(canvas.painted_cells(), 0);
        assert_eq!(canvas.rows().count(), 4);
    }

    #[test]
    fn out_of_bounds_access_is_ignored() {
        let mut canvas = Canvas::new(3);
        assert!(canvas.set(2, 2, 7));
        assert!(!canvas.set(3, 0, 7));
        assert!(!canvas.set(0, -1, 7));
        assert_eq!(canvas.get(2, 2), Some(7));
        assert_eq!(canvas.get(-1, 0), None);
        assert_eq!(canvas.painted_cells(), 1);
    }

    #[test]
    fn rows_are_indexed_by_y_then_x() {
        let mut canvas = Canvas::new(3);
        canvas.set(2, 1, 5);
        let rows: Vec<&[ColorCode]> = canvas.rows().collect();
        assert_eq!(rows[1], &[0, 0, 5]);
    }

    #[test]
    fn fill_box_is_clipped_to_the_canvas() {
        let mut canvas = Canvas::new(4);
        assert_eq!(canvas.fill_box((-10, 2), (1, 100), 3), 4);
        assert_eq!(canvas.get(0, 2), Some(3));
        assert_eq!(canvas.get(1, 3), Some(3));
        assert_eq!(canvas.get(2, 2), Some(BLANK));
        assert_eq!(canvas.painted_cells(), 4);
    }

    #[test]
    fn fill_box_outside_the_canvas_writes_nothing() {
        let mut canvas = Canvas::new(4);
        assert_eq!(canvas.fill_box((4, 0), (i64::from(i32::MAX), 3), 3), 0);
        assert_eq!(canvas.fill_box((2, 2), (1, 3), 3), 0);
        assert_eq!(canvas.painted_cells(), 0);
    }

    #[test]
    fn flood_fill_stays_inside_a_wall() {
        let mut canvas = Canvas::new(5);
        for y in 0..5 {
            canvas.set(2, y, 9);
        }
        let changed = canvas.flood_fill(0, 0, 4);
        assert_eq!(changed, 10);
        assert_eq!(canvas.get(1, 4), Some(4));
        assert_eq!(canvas.get(3, 0), Some(BLANK));
    }

    #[test]
    fn flood_fill_with_same_color_changes_nothing() {
        let mut canvas = Canvas::new(3);
        canvas.set(0, 0, 2);
        assert_eq!(canvas.flood_fill(0, 0, 2), 0);
        assert_eq!(canvas.painted_cells(), 1);
    }

    #[test]
    fn display_draws_a_frame() {
        let mut canvas = Canvas::new(2);
        canvas.set(1, 0, 1);
        assert_eq!(canvas.to_string(), "┌──┐\n│.#│\n│..│\n└──┘");
    }
}
