use std::collections::HashMap;
use std::f64::consts::PI;

use super::canvas::{Canvas, ColorCode};
use super::palette::Palette;
use crate::error::RuntimeError;
use crate::ir::ast::{BinaryOperator, Expression, Literal, Program, Statement};
use crate::ir::builtin::Builtin;

/// Brush color in effect before the first `Color` statement.
pub const DEFAULT_BRUSH_COLOR: &str = "Transparent";

/// Executes one program against a fresh canvas. All state lives and dies with
/// this value.
pub struct Interpreter<'p> {
    program: &'p Program,
    // Метки: имя -> индекс инструкции
    labels: HashMap<&'p str, usize>,
    canvas: Canvas,
    palette: Palette,
    variables: HashMap<String, i32>,
    // Курсор
    x: i32,
    y: i32,
    // Кисть
    brush_size: i32,
    brush_color: String,
    brush_code: ColorCode,
    program_counter: usize,
    steps: u64,
    step_limit: Option<u64>,
}

impl<'p> Interpreter<'p> {
    /// Fails before anything runs unless statement 0 is a `Spawn`.
    pub fn new(program: &'p Program, canvas_size: usize) -> Result<Self, RuntimeError> {
        if canvas_size == 0 {
            return Err(RuntimeError::InvalidCanvasSize { size: canvas_size });
        }
        if !matches!(program.statements.first(), Some(Statement::Spawn { .. })) {
            return Err(RuntimeError::MissingSpawn);
        }

        let mut labels = HashMap::new();
        for (index, statement) in program.statements.iter().enumerate() {
            if let Statement::Label { name } = statement {
                labels.entry(name.as_str()).or_insert(index);
            }
        }

        let mut palette = Palette::new();
        let brush_code = palette.intern(DEFAULT_BRUSH_COLOR);

        Ok(Self {
            program,
            labels,
            canvas: Canvas::new(canvas_size),
            palette,
            variables: HashMap::new(),
            x: 0,
            y: 0,
            brush_size: 1,
            brush_color: DEFAULT_BRUSH_COLOR.to_string(),
            brush_code,
            program_counter: 0,
            steps: 0,
            step_limit: None,
        })
    }

    /// Caps how many statements `execute` may run. `None` means unbounded.
    pub fn with_step_limit(mut self, limit: Option<u64>) -> Self {
        self.step_limit = limit;
        self
    }

    /// Runs until the program counter walks off the end of the program.
    pub fn execute(&mut self) -> Result<(), RuntimeError> {
        let program = self.program;

        while self.program_counter < program.len() {
            if let Some(limit) = self.step_limit {
                if self.steps >= limit {
                    return Err(RuntimeError::StepLimitExceeded { limit });
                }
            }

            let statement = &program.statements[self.program_counter];
            tracing::trace!(
                pc = self.program_counter,
                line = ?program.line_of(self.program_counter),
                statement = statement.kind_name(),
                "step"
            );

            if let Err(error) = self.step(statement) {
                tracing::debug!(
                    pc = self.program_counter,
                    line = ?program.line_of(self.program_counter),
                    %error,
                    "execution failed"
                );
                return Err(error);
            }

            self.steps += 1;
            self.program_counter += 1;
        }

        tracing::info!(steps = self.steps, painted = self.canvas.painted_cells(), "execution finished");
        Ok(())
    }

    fn step(&mut self, statement: &'p Statement) -> Result<(), RuntimeError> {
        match statement {
            Statement::Spawn { x, y } => {
                let x = self.evaluate(x)?;
                let y = self.evaluate(y)?;
                if !self.canvas.contains(x, y) {
                    return Err(RuntimeError::SpawnOutOfBounds { x, y });
                }
                self.x = x;
                self.y = y;
            }
            Statement::Color { name } => {
                self.brush_code = self.palette.intern(name);
                self.brush_color = name.clone();
            }
            Statement::Size { size } => {
                let size = self.evaluate(size)?;
                if size <= 0 {
                    return Err(RuntimeError::InvalidBrushSize { size });
                }
                self.brush_size = if size % 2 == 0 { size - 1 } else { size };
            }
            Statement::DrawLine { dir_x, dir_y, distance } => {
                let dx = self.evaluate(dir_x)?;
                let dy = self.evaluate(dir_y)?;
                let steps = self.evaluate(distance)?;
                self.draw_line(dx, dy, steps);
            }
            Statement::DrawCircle { dir_x, dir_y, radius } => {
                let dx = self.evaluate(dir_x)?;
                let dy = self.evaluate(dir_y)?;
                let radius = self.evaluate(radius)?;
                self.draw_circle(dx, dy, radius);
            }
            Statement::DrawRectangle { dir_x, dir_y, distance, width, height } => {
                let dx = self.evaluate(dir_x)?;
                let dy = self.evaluate(dir_y)?;
                let distance = self.evaluate(distance)?;
                let width = self.evaluate(width)?;
                let height = self.evaluate(height)?;
                self.draw_rectangle(dx, dy, distance, width, height);
            }
            Statement::Fill => self.fill()?,
            Statement::Assign { target, value } => {
                let value = self.evaluate(value)?;
                self.variables.insert(target.clone(), value);
            }
            Statement::ConditionalGoto { label, condition } => {
                if self.evaluate(condition)? != 0 {
                    let target = *self
                        .labels
                        .get(label.as_str())
                        .ok_or_else(|| RuntimeError::UndefinedLabel { name: label.clone() })?;
                    tracing::debug!(label = %label, target, "jump");
                    // Statement 0 is always the Spawn, so a label index is never 0.
                    // The loop's +1 then lands exactly on the label.
                    self.program_counter = target - 1;
                }
            }
            Statement::Label { .. } => {}
        }
        Ok(())
    }

    // === РИСОВАНИЕ === //

    /// Colors the brush-sized square centered on `(cx, cy)`, clipped to the canvas.
    fn paint(&mut self, cx: i32, cy: i32) {
        let r = i64::from(self.brush_size / 2);
        let (cx, cy) = (i64::from(cx), i64::from(cy));
        self.canvas.fill_box((cx - r, cy - r), (cx + r, cy + r), self.brush_code);
    }

    /// Paints `steps + 1` positions, leaving the cursor on the last one.
    fn draw_line(&mut self, dx: i32, dy: i32, steps: i32) {
        self.paint(self.x, self.y);
        for _ in 0..steps {
            self.x = self.x.wrapping_add(dx);
            self.y = self.y.wrapping_add(dy);
            self.paint(self.x, self.y);
        }
    }

    /// 360 samples at whole degrees around a center offset from the cursor.
    /// The cursor does not move.
    fn draw_circle(&mut self, dx: i32, dy: i32, radius: i32) {
        let cx = self.x.saturating_add(dx.saturating_mul(radius));
        let cy = self.y.saturating_add(dy.saturating_mul(radius));
        let r = f64::from(radius);

        for angle in 0..360 {
            let rad = f64::from(angle) * PI / 180.0;
            let px = cx.saturating_add((r * rad.cos()) as i32);
            let py = cy.saturating_add((r * rad.sin()) as i32);
            self.paint(px, py);
        }
    }

    /// Fills `width × height` cells whose top-left corner is offset from the
    /// cursor. The cursor does not move.
    fn draw_rectangle(&mut self, dx: i32, dy: i32, distance: i32, width: i32, height: i32) {
        if width <= 0 || height <= 0 {
            return;
        }
        let base_x = i64::from(self.x.saturating_add(dx.saturating_mul(distance)));
        let base_y = i64::from(self.y.saturating_add(dy.saturating_mul(distance)));

        // A brush stamped on every cell of the block covers the block grown by
        // the brush radius on each side.
        let r = i64::from(self.brush_size / 2);
        let far_x = base_x + i64::from(width) - 1;
        let far_y = base_y + i64::from(height) - 1;
        self.canvas.fill_box((base_x - r, base_y - r), (far_x + r, far_y + r), self.brush_code);
    }

    fn fill(&mut self) -> Result<(), RuntimeError> {
        let target = self
            .canvas
            .get(self.x, self.y)
            .ok_or(RuntimeError::CursorOutOfBounds { x: self.x, y: self.y })?;

        if target != self.brush_code {
            let changed = self.canvas.flood_fill(self.x, self.y, self.brush_code);
            tracing::debug!(changed, "flood fill");
        }
        Ok(())
    }

    // === ВЫРАЖЕНИЯ === //

    /// Booleans evaluate to 0 or 1; any nonzero value counts as true.
    pub fn evaluate(&self, expr: &Expression) -> Result<i32, RuntimeError> {
        match expr {
            Expression::Literal(Literal::Integer(n)) => Ok(*n),
            Expression::Literal(Literal::Boolean(b)) => Ok(i32::from(*b)),
            Expression::Literal(Literal::String(s)) => Err(RuntimeError::UnsupportedExpression {
                message: format!("string \"{}\" used as a number", s),
            }),
            Expression::Variable(name) => self
                .variables
                .get(name)
                .copied()
                .ok_or_else(|| RuntimeError::UndefinedVariable { name: name.clone() }),
            Expression::Grouping(inner) => self.evaluate(inner),
            Expression::Binary { left, op, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                apply_binary(*op, left, right)
            }
            Expression::FunctionCall { name, args } => self.call(name, args),
        }
    }

    fn call(&self, name: &str, args: &[Expression]) -> Result<i32, RuntimeError> {
        let builtin = Builtin::from_name(name)
            .ok_or_else(|| RuntimeError::UnknownFunction { name: name.to_string() })?;
        if args.len() != builtin.arity() {
            return Err(RuntimeError::UnsupportedExpression {
                message: format!("{} expects {} argument(s), got {}", name, builtin.arity(), args.len()),
            });
        }

        let value = match builtin {
            Builtin::GetActualX => self.x,
            Builtin::GetActualY => self.y,
            Builtin::GetCanvasSize => self.canvas.size() as i32,
            Builtin::GetColorCount => {
                let color = color_argument(&args[0]);
                let x1 = self.evaluate(&args[1])?;
                let y1 = self.evaluate(&args[2])?;
                let x2 = self.evaluate(&args[3])?;
                let y2 = self.evaluate(&args[4])?;
                self.color_count(color, (x1, y1), (x2, y2))
            }
            Builtin::IsBrushColor => i32::from(self.brush_color == color_argument(&args[0])),
            Builtin::IsBrushSize => i32::from(self.brush_size == self.evaluate(&args[0])?),
            Builtin::IsCanvasColor => {
                let color = color_argument(&args[0]);
                let vertical = self.evaluate(&args[1])?;
                let horizontal = self.evaluate(&args[2])?;
                let cell = self
                    .canvas
                    .get(self.x.saturating_add(horizontal), self.y.saturating_add(vertical));
                i32::from(cell.is_some() && cell == self.palette.code(color))
            }
        };
        Ok(value)
    }

    /// Cells of `color` in the inclusive box between two corners, or 0 when
    /// any corner falls outside the canvas.
    fn color_count(&self, color: &str, (x1, y1): (i32, i32), (x2, y2): (i32, i32)) -> i32 {
        let (min_x, max_x) = (x1.min(x2), x1.max(x2));
        let (min_y, max_y) = (y1.min(y2), y1.max(y2));
        if !self.canvas.contains(min_x, min_y) || !self.canvas.contains(max_x, max_y) {
            return 0;
        }
        let Some(code) = self.palette.code(color) else {
            return 0;
        };

        let mut count = 0;
        for x in min_x..=max_x {
            for y in min_y..=max_y {
                if self.canvas.get(x, y) == Some(code) {
                    count += 1;
                }
            }
        }
        count
    }

    // Состояние

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn into_canvas(self) -> Canvas {
        self.canvas
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn cursor(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn brush_size(&self) -> i32 {
        self.brush_size
    }

    pub fn brush_color(&self) -> &str {
        &self.brush_color
    }

    pub fn variable(&self, name: &str) -> Option<i32> {
        self.variables.get(name).copied()
    }

    /// Code painted for `name`, if that color has been selected so far.
    pub fn color_code(&self, name: &str) -> Option<ColorCode> {
        self.palette.code(name)
    }

    /// Statements executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

/// Color names are only read from string literals; anything else never matches.
fn color_argument(expr: &Expression) -> &str {
    match expr {
        Expression::Literal(Literal::String(name)) => name,
        _ => "",
    }
}

fn apply_binary(op: BinaryOperator, left: i32, right: i32) -> Result<i32, RuntimeError> {
    let value = match op {
        BinaryOperator::Add => left.wrapping_add(right),
        BinaryOperator::Subtract => left.wrapping_sub(right),
        BinaryOperator::Multiply => left.wrapping_mul(right),
        BinaryOperator::Divide => {
            if right == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            left.wrapping_div(right)
        }
        BinaryOperator::Modulo => {
            if right == 0 {
                return Err(RuntimeError::ModuloByZero);
            }
            left.wrapping_rem(right)
        }
        BinaryOperator::Power => f64::from(left).powf(f64::from(right)) as i32,
        BinaryOperator::Equal => i32::from(left == right),
        BinaryOperator::NotEqual => i32::from(left != right),
        BinaryOperator::Greater => i32::from(left > right),
        BinaryOperator::Less => i32::from(left < right),
        BinaryOperator::GreaterEqual => i32::from(left >= right),
        BinaryOperator::LessEqual => i32::from(left <= right),
        BinaryOperator::And => i32::from(left != 0 && right != 0),
        BinaryOperator::Or => i32::from(left != 0 || right != 0),
    };
    Ok(value)
}
