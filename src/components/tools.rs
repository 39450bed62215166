use image::Rgba;

use crate::canvas::{Canvas, StrokeBuffer};
use crate::components::layers::LayerStack;
use crate::ops::geometry::snap_to_cell;
use crate::ops::shapes::{self, CellWindow};
use crate::ops::transform::{self, Interpolation};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Pencil,
    Eraser,
    Pipette,
    Line,
    Rectangle,
    Ellipse,
    Arc,
}

impl Tool {
    pub fn all() -> &'static [Tool] {
        &[
            Tool::Pencil,
            Tool::Eraser,
            Tool::Pipette,
            Tool::Line,
            Tool::Rectangle,
            Tool::Ellipse,
            Tool::Arc,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tool::Pencil => "Pencil",
            Tool::Eraser => "Eraser",
            Tool::Pipette => "Pipette",
            Tool::Line => "Line",
            Tool::Rectangle => "Rect",
            Tool::Ellipse => "Ellipse",
            Tool::Arc => "Arc",
        }
    }

    /// Lower-case identifier used by replay scripts.
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pencil => "pencil",
            Tool::Eraser => "eraser",
            Tool::Pipette => "pipette",
            Tool::Line => "line",
            Tool::Rectangle => "rectangle",
            Tool::Ellipse => "ellipse",
            Tool::Arc => "arc",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Self::all().iter().copied().find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// Keyboard shortcut letter.
    pub fn shortcut(&self) -> char {
        match self {
            Tool::Pencil => 'P',
            Tool::Eraser => 'E',
            Tool::Pipette => 'I',
            Tool::Line => 'L',
            Tool::Rectangle => 'R',
            Tool::Ellipse => 'O',
            Tool::Arc => 'A',
        }
    }

    /// Shape tools re-render from a fixed anchor on every move.
    pub fn is_shape(&self) -> bool {
        matches!(self, Tool::Line | Tool::Rectangle | Tool::Ellipse | Tool::Arc)
    }
}

/// Cells covered by a shape tool dragged from `anchor` to `current`.
/// `constrain` forces square/circle, or flips the arc to its other half.
/// Straight edges are clipped to `window`.
pub fn shape_cells(
    tool: Tool,
    anchor: (i32, i32),
    current: (i32, i32),
    constrain: bool,
    cell: u32,
    window: CellWindow,
) -> Vec<(i32, i32)> {
    match tool {
        Tool::Line => shapes::line_clipped(anchor, current, cell, window),
        Tool::Rectangle => shapes::rectangle_clipped(anchor, current, constrain, cell, window),
        Tool::Ellipse => shapes::ellipse(anchor, current, constrain, cell),
        Tool::Arc => shapes::arc(anchor, current, constrain, cell),
        Tool::Pencil | Tool::Eraser | Tool::Pipette => Vec::new(),
    }
}

fn canvas_window(canvas: &Canvas) -> CellWindow {
    CellWindow::covering(canvas.width(), canvas.height(), canvas.cell_size())
}

// ============================================================================
// TOOL STATE MACHINE
// ============================================================================

/// Active tool, brush color, and the stroke in progress.
///
/// The tool that started a stroke owns it until release, even if the
/// selection changes in between.
#[derive(Clone, Debug)]
pub struct ToolState {
    pub tool: Tool,
    pub color: Rgba<u8>,
    active: Option<Tool>,
    /// Fixed start point of a shape drag.
    anchor: Option<(i32, i32)>,
    /// Previous pointer cell, for gap-free freehand strokes.
    last_pos: Option<(i32, i32)>,
    stroke: Option<StrokeBuffer>,
    constrain: bool,
}

impl Default for ToolState {
    fn default() -> Self {
        Self::new(Rgba([0, 0, 0, 255]))
    }
}

impl ToolState {
    pub fn new(color: Rgba<u8>) -> Self {
        Self {
            tool: Tool::Pencil,
            color,
            active: None,
            anchor: None,
            last_pos: None,
            stroke: None,
            constrain: false,
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_tool(&self) -> Option<Tool> {
        self.active
    }

    pub fn stroke(&self) -> Option<&StrokeBuffer> {
        self.stroke.as_ref()
    }

    pub fn anchor(&self) -> Option<(i32, i32)> {
        self.anchor
    }

    pub fn pointer_down(&mut self, cell: (i32, i32), canvas: &Canvas, layers: &mut LayerStack) {
        let size = canvas.cell_size();
        match self.tool {
            Tool::Pencil => {
                let mut stroke = StrokeBuffer::new(canvas.width(), canvas.height());
                stroke.fill_cells(&[cell], size, self.color);
                self.stroke = Some(stroke);
                self.last_pos = Some(cell);
                self.active = Some(Tool::Pencil);
            }
            Tool::Eraser => {
                layers.erase_cells(&[cell], size);
                self.last_pos = Some(cell);
                self.active = Some(Tool::Eraser);
            }
            Tool::Pipette => {
                if canvas.contains(cell.0, cell.1)
                    && let Some(color) = layers.sample(cell.0, cell.1)
                {
                    self.color = color;
                }
            }
            shape @ (Tool::Line | Tool::Rectangle | Tool::Ellipse | Tool::Arc) => {
                self.stroke = Some(StrokeBuffer::new(canvas.width(), canvas.height()));
                self.anchor = Some(cell);
                self.last_pos = Some(cell);
                self.active = Some(shape);
                self.render_shape(canvas);
            }
        }
    }

    pub fn pointer_move(&mut self, cell: (i32, i32), canvas: &Canvas, layers: &mut LayerStack) {
        let size = canvas.cell_size();
        let Some(active) = self.active else { return };
        let last = self.last_pos.unwrap_or(cell);
        // Only the on-canvas part of a freehand segment is ever built
        let window = canvas_window(canvas);
        match active {
            Tool::Pencil => {
                if let Some(stroke) = self.stroke.as_mut() {
                    let cells = shapes::line_clipped(last, cell, size, window);
                    stroke.fill_cells(&cells, size, self.color);
                }
                self.last_pos = Some(cell);
            }
            Tool::Eraser => {
                layers.erase_cells(&shapes::line_clipped(last, cell, size, window), size);
                self.last_pos = Some(cell);
            }
            Tool::Line | Tool::Rectangle | Tool::Ellipse | Tool::Arc => {
                self.last_pos = Some(cell);
                self.render_shape(canvas);
            }
            Tool::Pipette => {}
        }
    }

    /// Finish the stroke.  Additive strokes become a new top layer; returns
    /// true when a layer was committed.
    pub fn pointer_up(&mut self, layers: &mut LayerStack, discard_empty: bool) -> bool {
        self.active = None;
        self.anchor = None;
        self.last_pos = None;
        let Some(stroke) = self.stroke.take() else { return false };
        if discard_empty && !stroke.is_painted() {
            return false;
        }
        let name = layers.next_stroke_name();
        layers.push(stroke.into_layer(name));
        true
    }

    /// Update the constrain modifier.  A shape preview in progress is
    /// re-rendered right away so it matches what release would commit.
    pub fn set_constrain(&mut self, constrain: bool, canvas: &Canvas) {
        if self.constrain == constrain {
            return;
        }
        self.constrain = constrain;
        if self.active.is_some_and(|t| t.is_shape()) {
            self.render_shape(canvas);
        }
    }

    /// Clear and redraw the shape preview from anchor to the last position.
    fn render_shape(&mut self, canvas: &Canvas) {
        let (Some(active), Some(anchor), Some(current)) = (self.active, self.anchor, self.last_pos)
        else {
            return;
        };
        let cell_size = canvas.cell_size();
        let window = canvas_window(canvas);
        let cells = shape_cells(active, anchor, current, self.constrain, cell_size, window);
        if let Some(stroke) = self.stroke.as_mut() {
            stroke.clear();
            stroke.fill_cells(&cells, cell_size, self.color);
        }
    }

    /// Carry the stroke in progress across a canvas rescale.  Shape previews
    /// are redrawn at the new size; freehand buffers are resampled.
    pub fn rescale(&mut self, old_size: (u32, u32), canvas: &Canvas, interp: Interpolation) {
        let (new_w, new_h) = (canvas.width(), canvas.height());
        let sx = new_w as f64 / old_size.0.max(1) as f64;
        let sy = new_h as f64 / old_size.1.max(1) as f64;
        let cell = canvas.cell_size();
        let scale_point = |p: (i32, i32)| {
            let x = (p.0 as f64 * sx).round() as i32;
            let y = (p.1 as f64 * sy).round() as i32;
            snap_to_cell(x, y, cell)
        };
        self.anchor = self.anchor.map(scale_point);
        self.last_pos = self.last_pos.map(scale_point);

        let Some(stroke) = self.stroke.as_mut() else { return };
        if self.active.is_some_and(|t| t.is_shape()) {
            *stroke = StrokeBuffer::new(new_w, new_h);
            self.render_shape(canvas);
        } else {
            stroke.pixels = transform::resample(&stroke.pixels, new_w, new_h, interp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::pixel_at;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn setup() -> (Canvas, LayerStack, ToolState) {
        (Canvas::new(100, 100, 10, 2.0), LayerStack::new(64), ToolState::new(RED))
    }

    #[test]
    fn test_pencil_fills_gaps_between_moves() {
        let (canvas, mut layers, mut tools) = setup();
        tools.pointer_down((0, 0), &canvas, &mut layers);
        tools.pointer_move((50, 0), &canvas, &mut layers);
        let stroke = tools.stroke().unwrap();
        for x in (0..=50).step_by(10) {
            assert_eq!(pixel_at(&stroke.pixels, x + 5, 5), Some(RED), "gap at x={}", x);
        }
        assert!(tools.pointer_up(&mut layers, false));
        assert_eq!(layers.len(), 1);
        assert!(tools.stroke().is_none());
        assert!(!tools.is_drawing());
    }

    #[test]
    fn test_shape_preview_is_rerendered_not_trailed() {
        let (canvas, mut layers, mut tools) = setup();
        tools.tool = Tool::Line;
        tools.pointer_down((0, 0), &canvas, &mut layers);
        tools.pointer_move((90, 0), &canvas, &mut layers);
        tools.pointer_move((0, 90), &canvas, &mut layers);
        let stroke = tools.stroke().unwrap();
        // The first preview (horizontal line) is gone
        assert_eq!(pixel_at(&stroke.pixels, 95, 5).map(|p| p[3]), Some(0));
        assert_eq!(pixel_at(&stroke.pixels, 5, 95), Some(RED));
        assert_eq!(tools.anchor(), Some((0, 0)));
    }

    #[test]
    fn test_constrain_toggle_redraws_preview() {
        let (canvas, mut layers, mut tools) = setup();
        tools.tool = Tool::Rectangle;
        tools.pointer_down((0, 0), &canvas, &mut layers);
        tools.pointer_move((90, 40), &canvas, &mut layers);
        assert_eq!(pixel_at(&tools.stroke().unwrap().pixels, 95, 5), Some(RED));
        tools.set_constrain(true, &canvas);
        let stroke = tools.stroke().unwrap();
        assert_eq!(pixel_at(&stroke.pixels, 95, 5).map(|p| p[3]), Some(0));
        assert_eq!(pixel_at(&stroke.pixels, 45, 45), Some(RED));
    }

    #[test]
    fn test_eraser_clears_all_layers_without_new_layer() {
        let (canvas, mut layers, mut tools) = setup();
        tools.pointer_down((0, 0), &canvas, &mut layers);
        tools.pointer_move((30, 0), &canvas, &mut layers);
        tools.pointer_up(&mut layers, false);
        tools.pointer_down((0, 0), &canvas, &mut layers);
        tools.pointer_up(&mut layers, false);
        assert_eq!(layers.len(), 2);

        tools.tool = Tool::Eraser;
        tools.pointer_down((0, 0), &canvas, &mut layers);
        tools.pointer_move((20, 0), &canvas, &mut layers);
        assert!(!tools.pointer_up(&mut layers, false));
        assert_eq!(layers.len(), 2);
        for layer in layers.layers() {
            for x in [5, 15, 25] {
                assert_eq!(layer.pixel(x, 5).map(|p| p[3]), Some(0));
            }
        }
        // Cell beyond the eraser path survives in the first layer
        assert_eq!(layers.layers()[0].pixel(35, 5), Some(RED));
    }

    #[test]
    fn test_pipette_takes_top_most_color() {
        let (canvas, mut layers, mut tools) = setup();
        tools.pointer_down((10, 10), &canvas, &mut layers);
        tools.pointer_up(&mut layers, false);
        tools.color = Rgba([0, 255, 0, 255]);
        tools.pointer_down((10, 10), &canvas, &mut layers);
        tools.pointer_up(&mut layers, false);

        tools.color = Rgba([1, 2, 3, 255]);
        tools.tool = Tool::Pipette;
        tools.pointer_down((10, 10), &canvas, &mut layers);
        assert_eq!(tools.color, Rgba([0, 255, 0, 255]));
        assert!(!tools.pointer_up(&mut layers, false));
        // Empty spot leaves the color alone
        tools.pointer_down((80, 80), &canvas, &mut layers);
        assert_eq!(tools.color, Rgba([0, 255, 0, 255]));
        assert_eq!(layers.len(), 2);
    }

    #[test]
    fn test_empty_strokes_commit_unless_discarded() {
        let (canvas, mut layers, mut tools) = setup();
        // Off-canvas press draws nothing
        tools.pointer_down((500, 500), &canvas, &mut layers);
        assert!(tools.pointer_up(&mut layers, false));
        assert_eq!(layers.len(), 1);
        tools.pointer_down((500, 500), &canvas, &mut layers);
        assert!(!tools.pointer_up(&mut layers, true));
        assert_eq!(layers.len(), 1);
    }

    #[test]
    fn test_stroke_owner_survives_tool_switch() {
        let (canvas, mut layers, mut tools) = setup();
        tools.pointer_down((0, 0), &canvas, &mut layers);
        tools.tool = Tool::Eraser;
        tools.pointer_move((20, 0), &canvas, &mut layers);
        assert_eq!(tools.active_tool(), Some(Tool::Pencil));
        assert!(tools.pointer_up(&mut layers, false));
    }

    #[test]
    fn test_rescale_redraws_shape_at_new_size() {
        let (mut canvas, mut layers, mut tools) = setup();
        tools.tool = Tool::Line;
        tools.pointer_down((0, 0), &canvas, &mut layers);
        tools.pointer_move((80, 0), &canvas, &mut layers);
        canvas.set_zoom_level(1);
        tools.rescale((100, 100), &canvas, Interpolation::Nearest);
        let stroke = tools.stroke().unwrap();
        assert_eq!(stroke.pixels.dimensions(), (50, 50));
        assert_eq!(tools.last_pos, Some((40, 0)));
        assert_eq!(pixel_at(&stroke.pixels, 44, 2), Some(RED));
    }

    #[test]
    fn test_freehand_far_moves_stay_on_canvas() {
        let (canvas, mut layers, mut tools) = setup();
        tools.pointer_down((0, 0), &canvas, &mut layers);
        tools.pointer_move((i32::MAX, 0), &canvas, &mut layers);
        tools.pointer_move((i32::MIN, 0), &canvas, &mut layers);
        let stroke = tools.stroke().unwrap();
        for x in (5..100).step_by(10) {
            assert_eq!(pixel_at(&stroke.pixels, x, 5), Some(RED), "row gap at x={}", x);
        }
        assert_eq!(pixel_at(&stroke.pixels, 5, 15).map(|p| p[3]), Some(0));
        assert!(tools.pointer_up(&mut layers, false));

        tools.tool = Tool::Eraser;
        tools.pointer_down((i32::MIN, i32::MIN), &canvas, &mut layers);
        tools.pointer_move((i32::MAX, i32::MAX), &canvas, &mut layers);
        tools.pointer_up(&mut layers, false);
        // The diagonal crossed the canvas through (0, 0)
        assert_eq!(layers.layers()[0].pixel(5, 5).map(|p| p[3]), Some(0));
        assert_eq!(layers.layers()[0].pixel(15, 5), Some(RED));
    }

    #[test]
    fn test_rescale_resamples_freehand_stroke() {
        let (mut canvas, mut layers, mut tools) = setup();
        tools.pointer_down((10, 10), &canvas, &mut layers);
        canvas.set_zoom_level(-1);
        tools.rescale((100, 100), &canvas, Interpolation::Nearest);

        let stroke = tools.stroke().unwrap();
        assert_eq!(stroke.pixels.dimensions(), (200, 200));
        assert_eq!(tools.last_pos, Some((20, 20)));
        assert_eq!(pixel_at(&stroke.pixels, 30, 30), Some(RED));
        assert_eq!(pixel_at(&stroke.pixels, 15, 15).map(|p| p[3]), Some(0));
        assert_eq!(pixel_at(&stroke.pixels, 45, 30).map(|p| p[3]), Some(0));

        // Continuing the stroke uses the new cell size from the scaled position
        tools.pointer_move((60, 20), &canvas, &mut layers);
        assert!(tools.pointer_up(&mut layers, false));
        let top = layers.top().unwrap();
        assert_eq!((top.width(), top.height()), (200, 200));
        assert_eq!(top.pixel(50, 30), Some(RED));
        assert_eq!(top.pixel(70, 30), Some(RED));
        assert_eq!(top.pixel(70, 45).map(|p| p[3]), Some(0));
    }
}
