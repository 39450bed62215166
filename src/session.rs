// ============================================================================
// SESSION: owns one document and routes input events to it
// ============================================================================

use eframe::egui::Pos2;
use image::Rgba;
use std::path::PathBuf;

use crate::canvas::Canvas;
use crate::components::colors::{PaletteLookup, SwatchPalette};
use crate::components::layers::LayerStack;
use crate::components::toolbar::{ToolbarLayout, ToolbarRow};
use crate::components::tools::{Tool, ToolState};
use crate::compositor::Frame;
use crate::io::{self, ExportError, ExportFormat, ExportStatus};
use crate::ops::canvas_ops::{self, ZoomBounds, ZoomDirection};
use crate::ops::geometry;
use crate::settings::AppSettings;
use crate::viewport::Viewport;

/// One input event, already decoupled from the windowing backend.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Pos2 },
    PointerMove { pos: Pos2 },
    PointerUp { pos: Pos2 },
    Zoom(ZoomDirection),
    Resize { width: u32, height: u32 },
    Undo,
    Clear,
    SelectTool(Tool),
    SetColor(Rgba<u8>),
    Export(ExportFormat),
}

pub struct Session {
    pub settings: AppSettings,
    canvas: Canvas,
    layers: LayerStack,
    viewport: Viewport,
    tools: ToolState,
    palette: Box<dyn PaletteLookup>,
    toolbar: Box<dyn ToolbarLayout>,
    status: Option<ExportStatus>,
}

impl Session {
    pub fn new(settings: AppSettings) -> Self {
        Self::with_collaborators(
            settings,
            Box::new(SwatchPalette::default()),
            Box::new(ToolbarRow::default()),
        )
    }

    pub fn with_collaborators(
        settings: AppSettings,
        palette: Box<dyn PaletteLookup>,
        toolbar: Box<dyn ToolbarLayout>,
    ) -> Self {
        let canvas = Canvas::new(
            settings.canvas_width,
            settings.canvas_height,
            settings.cell_size,
            settings.zoom_factor,
        );
        let viewport = Viewport::new(
            settings.window_width,
            settings.window_height,
            canvas.width(),
            canvas.height(),
        );
        log_info!(
            "Session started: window {}x{}, canvas {}x{}, cell size {}",
            settings.window_width,
            settings.window_height,
            canvas.width(),
            canvas.height(),
            canvas.cell_size()
        );
        Self {
            layers: LayerStack::new(settings.max_layers),
            settings,
            canvas,
            viewport,
            tools: ToolState::default(),
            palette,
            toolbar,
            status: None,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn toolbar(&self) -> &dyn ToolbarLayout {
        self.toolbar.as_ref()
    }

    pub fn export_status(&self) -> Option<&ExportStatus> {
        self.status.as_ref()
    }

    /// Borrow everything the compositor needs for one frame.
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            layers: &self.layers,
            stroke: self.tools.stroke(),
            viewport: &self.viewport,
            color: self.tools.color,
            tool: self.tools.tool,
            palette: self.palette.as_ref(),
            toolbar: self.toolbar.as_ref(),
        }
    }

    /// Modifier state, sampled once per update.
    pub fn set_modifiers(&mut self, shift: bool) {
        self.tools.set_constrain(shift, &self.canvas);
    }

    /// Advance per-frame timers.
    pub fn tick(&mut self) {
        let expired = self.status.as_mut().is_some_and(|s| !s.tick());
        if expired {
            self.status = None;
        }
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown { pos } => self.pointer_down(pos),
            InputEvent::PointerMove { pos } => self.pointer_move(pos),
            InputEvent::PointerUp { .. } => self.pointer_up(),
            InputEvent::Zoom(direction) => {
                canvas_ops::zoom(
                    &mut self.canvas,
                    &mut self.layers,
                    &mut self.tools,
                    &mut self.viewport,
                    direction,
                    ZoomBounds::from_settings(&self.settings),
                    self.settings.resample_filter,
                );
            }
            InputEvent::Resize { width, height } => {
                if self.viewport.window_size() != (width, height) {
                    self.viewport.set_window_size(width, height);
                    log_info!("Window resized to {}x{}", width, height);
                }
            }
            InputEvent::Undo => {
                if let Some(layer) = self.layers.undo() {
                    log_info!("Undo: removed {} ({} left)", layer.name, self.layers.len());
                }
            }
            InputEvent::Clear => {
                let count = self.layers.len();
                self.layers.clear();
                log_info!("Cleared {} layers", count);
            }
            InputEvent::SelectTool(tool) => self.tools.tool = tool,
            InputEvent::SetColor(color) => self.tools.color = color,
            InputEvent::Export(format) => {
                let _ = self.export(format);
            }
        }
    }

    /// Hit priority: right scrollbar, bottom scrollbar, drawing area,
    /// palette, toolbar.
    fn pointer_down(&mut self, pos: Pos2) {
        if self.viewport.pointer_down(pos) {
            return;
        }
        if self.viewport.in_drawable_area(pos) {
            if !self.tools.is_drawing() {
                let cell = geometry::to_canvas(pos, &self.viewport, self.canvas.cell_size());
                self.tools.pointer_down(cell, &self.canvas, &mut self.layers);
            }
            return;
        }
        if let Some(color) = self.palette.color_at(pos) {
            self.tools.color = color;
            return;
        }
        if let Some(tool) = self.toolbar.tool_at(pos) {
            self.tools.tool = tool;
        }
    }

    fn pointer_move(&mut self, pos: Pos2) {
        if self.viewport.pointer_move(pos) {
            return;
        }
        if self.tools.is_drawing() {
            let cell = geometry::to_canvas(pos, &self.viewport, self.canvas.cell_size());
            self.tools.pointer_move(cell, &self.canvas, &mut self.layers);
        }
    }

    fn pointer_up(&mut self) {
        self.viewport.pointer_up();
        if self.tools.is_drawing() {
            self.tools.pointer_up(&mut self.layers, self.settings.discard_empty_strokes);
        }
    }

    /// Export the current layers and raise the status indicator.
    pub fn export(&mut self, format: ExportFormat) -> Result<PathBuf, ExportError> {
        let result = io::export(self.layers.layers(), &self.settings, format);
        match &result {
            Ok(path) => {
                log_info!("Exported {}", path.display());
            }
            Err(e) => {
                log_err!("Export failed: {}", e);
            }
        }
        self.status = Some(ExportStatus::from_result(&result, self.settings.indicator_frames));
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::CANVAS_ANCHOR;
    use eframe::egui::Vec2;

    fn screen(x: f32, y: f32) -> Pos2 {
        CANVAS_ANCHOR + Vec2::new(x, y)
    }

    #[test]
    fn test_click_draws_and_commits() {
        let mut session = Session::new(AppSettings::default());
        session.handle(InputEvent::PointerDown { pos: screen(30.0, 30.0) });
        assert!(session.tools().is_drawing());
        session.handle(InputEvent::PointerUp { pos: screen(30.0, 30.0) });
        assert_eq!(session.layers().len(), 1);
        let top = session.layers().top().unwrap();
        assert_eq!(top.pixel(24, 24), Some(Rgba([0, 0, 0, 255])));
        assert_eq!(top.pixel(23, 24).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_palette_and_toolbar_hits() {
        let mut session = Session::new(AppSettings::default());
        session.handle(InputEvent::PointerDown { pos: Pos2::new(150.0 + 24.0 * 5.0 + 5.0, 19.0) });
        session.handle(InputEvent::PointerUp { pos: Pos2::ZERO });
        assert_eq!(session.tools().color, Rgba([241, 26, 41, 255]));

        let (rect, tool) = session.toolbar().buttons()[3];
        session.handle(InputEvent::PointerDown { pos: rect.center() });
        assert_eq!(session.tools().tool, tool);
        assert!(session.layers().is_empty());
    }

    #[test]
    fn test_shift_constrains_live_preview() {
        let mut session = Session::new(AppSettings::default());
        session.handle(InputEvent::SelectTool(Tool::Rectangle));
        session.handle(InputEvent::PointerDown { pos: screen(0.0, 0.0) });
        session.handle(InputEvent::PointerMove { pos: screen(120.0, 48.0) });
        session.set_modifiers(true);
        session.handle(InputEvent::PointerUp { pos: screen(120.0, 48.0) });
        let top = session.layers().top().unwrap();
        // Square of side 48: the far corner cell is at (48, 48)
        assert_eq!(top.pixel(50, 50).map(|p| p[3]), Some(255));
        assert_eq!(top.pixel(110, 2).map(|p| p[3]), Some(0));
    }

    #[test]
    fn test_status_expires_after_configured_frames() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings {
            export_dir: dir.path().to_path_buf(),
            export_width: 32,
            export_height: 32,
            indicator_frames: 3,
            ..AppSettings::default()
        };
        let mut session = Session::new(settings);
        session.handle(InputEvent::Export(ExportFormat::Png));
        assert!(session.export_status().is_some_and(|s| s.ok));
        session.tick();
        session.tick();
        assert!(session.export_status().is_some());
        session.tick();
        assert!(session.export_status().is_none());
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut session = Session::new(AppSettings::default());
        session.handle(InputEvent::Resize { width: 600, height: 500 });
        assert_eq!(session.viewport().window_size(), (600, 500));
        assert!(session.viewport().right_bar.visible);
        assert!(session.viewport().bottom_bar.visible);
    }

    #[test]
    fn test_far_pointer_moves_only_paint_the_canvas() {
        let settings = AppSettings {
            cell_size: 1,
            min_cell_size: 1,
            ..AppSettings::default()
        };
        let mut session = Session::new(settings);
        session.handle(InputEvent::PointerDown { pos: screen(5.0, 5.0) });
        session.handle(InputEvent::PointerMove { pos: Pos2::new(-1.0e12, 125.0) });
        session.handle(InputEvent::PointerMove { pos: Pos2::new(6.0e7, 125.0) });
        session.handle(InputEvent::PointerUp { pos: Pos2::ZERO });
        let top = session.layers().top().unwrap();
        assert_eq!(top.pixel(0, 5), Some(Rgba([0, 0, 0, 255])));
        assert_eq!(top.pixel(959, 5), Some(Rgba([0, 0, 0, 255])));
        assert_eq!(top.pixel(5, 6).map(|p| p[3]), Some(0));
    }
}
