// ============================================================================
// VIEWPORT: visible window over the canvas, driven by two scrollbars
// ============================================================================

use eframe::egui;
use egui::{Pos2, Rect, Vec2};

/// Fixed top-left position of the canvas inside the window.
pub const CANVAS_ANCHOR: Pos2 = Pos2 { x: 20.0, y: 120.0 };
/// Empty band between the drawable area and the right/bottom window edges.
pub const GUTTER: f32 = 20.0;
/// Bar thickness across its axis.
pub const SCROLLBAR_THICKNESS: f32 = 10.0;
/// Distance from the window edge to the bar's outer side.
pub const SCROLLBAR_EDGE_OFFSET: f32 = 15.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Right-hand bar, scrolls along y.
    Vertical,
    /// Bottom bar, scrolls along x.
    Horizontal,
}

/// Pointer interaction state of one scrollbar.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum ScrollbarState {
    #[default]
    Idle,
    /// Pressed but not moved yet.  `shift` is pointer minus leading edge.
    Armed { shift: f32 },
    Dragging { shift: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scrollbar {
    pub axis: Axis,
    /// Leading edge along the axis, in window coordinates.
    pub position: f32,
    pub length: f32,
    pub state: ScrollbarState,
    /// Only shown when the canvas overflows the drawable area on this axis.
    pub visible: bool,
}

impl Scrollbar {
    fn new(axis: Axis) -> Self {
        let start = match axis {
            Axis::Vertical => CANVAS_ANCHOR.y,
            Axis::Horizontal => CANVAS_ANCHOR.x,
        };
        Self { axis, position: start, length: 0.0, state: ScrollbarState::Idle, visible: false }
    }

    pub fn is_active(&self) -> bool {
        self.state != ScrollbarState::Idle
    }

    fn shift(&self) -> Option<f32> {
        match self.state {
            ScrollbarState::Idle => None,
            ScrollbarState::Armed { shift } | ScrollbarState::Dragging { shift } => Some(shift),
        }
    }
}

/// Window size, canvas size, and the pan offset derived from the scrollbars.
#[derive(Clone, Debug)]
pub struct Viewport {
    window_width: f32,
    window_height: f32,
    canvas_width: f32,
    canvas_height: f32,
    pan: Vec2,
    pub right_bar: Scrollbar,
    pub bottom_bar: Scrollbar,
}

impl Viewport {
    pub fn new(
        window_width: u32,
        window_height: u32,
        canvas_width: u32,
        canvas_height: u32,
    ) -> Self {
        let mut vp = Self {
            window_width: window_width as f32,
            window_height: window_height as f32,
            canvas_width: canvas_width as f32,
            canvas_height: canvas_height as f32,
            pan: Vec2::ZERO,
            right_bar: Scrollbar::new(Axis::Vertical),
            bottom_bar: Scrollbar::new(Axis::Horizontal),
        };
        vp.right_bar.length = vp.window_height / 10.0;
        vp.bottom_bar.length = vp.window_width / 10.0;
        vp.refresh();
        vp
    }

    pub fn anchor(&self) -> Pos2 {
        CANVAS_ANCHOR
    }

    /// Current scroll displacement of the window over the canvas.
    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width as u32, self.window_height as u32)
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width as u32, self.canvas_height as u32)
    }

    /// Size of the window region the canvas is shown in.
    pub fn drawable_size(&self) -> Vec2 {
        Vec2::new(
            (self.window_width - CANVAS_ANCHOR.x - GUTTER).max(0.0),
            (self.window_height - CANVAS_ANCHOR.y - GUTTER).max(0.0),
        )
    }

    pub fn drawable_rect(&self) -> Rect {
        Rect::from_min_size(CANVAS_ANCHOR, self.drawable_size())
    }

    /// Whether a screen point falls on the drawing area (edges included).
    pub fn in_drawable_area(&self, pos: Pos2) -> bool {
        self.drawable_rect().contains(pos)
    }

    /// Screen position of the canvas's top-left pixel.
    pub fn canvas_origin_on_screen(&self) -> Pos2 {
        CANVAS_ANCHOR - self.pan
    }

    /// `(start, end)` of the leading edge's travel range for a bar.
    fn track(&self, axis: Axis) -> (f32, f32) {
        match axis {
            Axis::Vertical => {
                let end = self.window_height - self.right_bar.length - GUTTER;
                (CANVAS_ANCHOR.y, end.max(CANVAS_ANCHOR.y))
            }
            Axis::Horizontal => {
                let end = self.window_width - self.bottom_bar.length - GUTTER;
                (CANVAS_ANCHOR.x, end.max(CANVAS_ANCHOR.x))
            }
        }
    }

    /// How far the canvas extends past the drawable area on an axis.
    fn overflow(&self, axis: Axis) -> f32 {
        let drawable = self.drawable_size();
        match axis {
            Axis::Vertical => (self.canvas_height - drawable.y).max(0.0),
            Axis::Horizontal => (self.canvas_width - drawable.x).max(0.0),
        }
    }

    fn bar(&self, axis: Axis) -> &Scrollbar {
        match axis {
            Axis::Vertical => &self.right_bar,
            Axis::Horizontal => &self.bottom_bar,
        }
    }

    fn bar_mut(&mut self, axis: Axis) -> &mut Scrollbar {
        match axis {
            Axis::Vertical => &mut self.right_bar,
            Axis::Horizontal => &mut self.bottom_bar,
        }
    }

    /// Track position of a bar as a fraction in `[0, 1]`.
    fn fraction(&self, axis: Axis) -> f32 {
        let (start, end) = self.track(axis);
        let span = end - start;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.bar(axis).position - start) / span).clamp(0.0, 1.0)
    }

    fn set_fraction(&mut self, axis: Axis, fraction: f32) {
        let (start, end) = self.track(axis);
        self.bar_mut(axis).position = start + (end - start) * fraction.clamp(0.0, 1.0);
    }

    /// Screen rectangle of a bar (regardless of visibility).
    pub fn bar_rect(&self, axis: Axis) -> Rect {
        let bar = self.bar(axis);
        match axis {
            Axis::Vertical => Rect::from_min_size(
                Pos2::new(self.window_width - SCROLLBAR_EDGE_OFFSET, bar.position),
                Vec2::new(SCROLLBAR_THICKNESS, bar.length),
            ),
            Axis::Horizontal => Rect::from_min_size(
                Pos2::new(bar.position, self.window_height - SCROLLBAR_EDGE_OFFSET),
                Vec2::new(bar.length, SCROLLBAR_THICKNESS),
            ),
        }
    }

    /// Re-derive visibility, bar positions, and the pan offset after any
    /// change of window size, canvas size, or bar position.
    fn refresh(&mut self) {
        for axis in [Axis::Vertical, Axis::Horizontal] {
            let overflow = self.overflow(axis);
            let (start, end) = self.track(axis);
            if overflow <= 0.0 {
                let bar = self.bar_mut(axis);
                bar.visible = false;
                bar.position = start;
                bar.state = ScrollbarState::Idle;
                self.set_pan_axis(axis, 0.0);
            } else {
                let fraction = self.fraction(axis);
                let bar = self.bar_mut(axis);
                bar.visible = true;
                bar.position = bar.position.clamp(start, end);
                self.set_pan_axis(axis, (fraction * overflow).clamp(0.0, overflow));
            }
        }
    }

    fn set_pan_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::Vertical => self.pan.y = value,
            Axis::Horizontal => self.pan.x = value,
        }
    }

    /// Window resize: bar lengths follow the window, pan keeps its fraction.
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        let fv = self.fraction(Axis::Vertical);
        let fh = self.fraction(Axis::Horizontal);
        self.window_width = width as f32;
        self.window_height = height as f32;
        self.right_bar.length = self.window_height / 10.0;
        self.bottom_bar.length = self.window_width / 10.0;
        self.set_fraction(Axis::Vertical, fv);
        self.set_fraction(Axis::Horizontal, fh);
        self.refresh();
    }

    /// Canvas resize (zoom): pan keeps its fraction of the new overflow.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.canvas_width = width as f32;
        self.canvas_height = height as f32;
        self.refresh();
    }

    // ------------------------------------------------------------------------
    // Pointer handling
    // ------------------------------------------------------------------------

    /// Arm a bar if the press lands on it.  Right bar wins over bottom bar.
    /// Returns true when the press was consumed.
    pub fn pointer_down(&mut self, pos: Pos2) -> bool {
        for axis in [Axis::Vertical, Axis::Horizontal] {
            if self.bar(axis).visible && hit(self.bar_rect(axis), pos) {
                let lead = match axis {
                    Axis::Vertical => pos.y,
                    Axis::Horizontal => pos.x,
                };
                let bar = self.bar_mut(axis);
                bar.state = ScrollbarState::Armed { shift: lead - bar.position };
                return true;
            }
        }
        false
    }

    /// Drag whichever bar is armed.  Returns true when a bar consumed the move.
    pub fn pointer_move(&mut self, pos: Pos2) -> bool {
        let mut consumed = false;
        for axis in [Axis::Vertical, Axis::Horizontal] {
            let bar = self.bar(axis);
            let Some(shift) = bar.shift() else { continue };
            if !bar.visible {
                continue;
            }
            let lead = match axis {
                Axis::Vertical => pos.y,
                Axis::Horizontal => pos.x,
            };
            let (start, end) = self.track(axis);
            let bar = self.bar_mut(axis);
            bar.state = ScrollbarState::Dragging { shift };
            bar.position = (lead - shift).clamp(start, end);
            consumed = true;
        }
        if consumed {
            self.refresh();
        }
        consumed
    }

    /// Release both bars.  Returns true when one of them was active.
    pub fn pointer_up(&mut self) -> bool {
        let was_active = self.is_dragging();
        self.right_bar.state = ScrollbarState::Idle;
        self.bottom_bar.state = ScrollbarState::Idle;
        was_active
    }

    pub fn is_dragging(&self) -> bool {
        self.right_bar.is_active() || self.bottom_bar.is_active()
    }
}

/// Half-open hit test `[min, max)` like the bar's pixel extent.
fn hit(rect: Rect, pos: Pos2) -> bool {
    pos.x >= rect.min.x && pos.x < rect.max.x && pos.y >= rect.min.y && pos.y < rect.max.y
}
