// ============================================================================
// CANVAS-LEVEL OPERATIONS: zoom steps that rescale the whole document
// ============================================================================

use crate::canvas::Canvas;
use crate::components::layers::LayerStack;
use crate::components::tools::ToolState;
use crate::ops::transform::Interpolation;
use crate::settings::AppSettings;
use crate::viewport::Viewport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomDirection {
    /// Divide canvas size and cell size by the zoom factor.
    In,
    /// Multiply canvas size and cell size by the zoom factor.
    Out,
}

/// Limits a zoom step must respect.  Cell size and canvas width are
/// checked together, so a step either keeps all of them in range or does
/// not happen at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoomBounds {
    pub min_cell_size: u32,
    pub max_cell_size: u32,
    pub min_canvas_width: u32,
    pub max_canvas_width: u32,
}

impl ZoomBounds {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            min_cell_size: settings.min_cell_size,
            max_cell_size: settings.max_cell_size,
            min_canvas_width: settings.min_canvas_width,
            max_canvas_width: settings.max_canvas_width,
        }
    }

    pub fn allows(&self, width: u32, cell_size: u32) -> bool {
        (self.min_cell_size..=self.max_cell_size).contains(&cell_size)
            && (self.min_canvas_width..=self.max_canvas_width).contains(&width)
    }
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self::from_settings(&AppSettings::default())
    }
}

/// Apply one zoom step: update the canvas geometry, resample every layer and
/// the stroke in progress, and let the viewport re-clamp its pan.
///
/// Returns false when the step would leave `bounds`; nothing changes then.
pub fn zoom(
    canvas: &mut Canvas,
    layers: &mut LayerStack,
    tools: &mut ToolState,
    viewport: &mut Viewport,
    direction: ZoomDirection,
    bounds: ZoomBounds,
    interp: Interpolation,
) -> bool {
    let target = match direction {
        ZoomDirection::In => canvas.zoom_level() + 1,
        ZoomDirection::Out => canvas.zoom_level() - 1,
    };
    let (w, h, cell) = canvas.geometry_at(target);
    if !bounds.allows(w, cell) {
        log_info!(
            "Zoom {:?} ignored: {}x{} cell {} is outside the zoom bounds",
            direction, w, h, cell
        );
        return false;
    }

    let old_size = (canvas.width(), canvas.height());
    canvas.set_zoom_level(target);
    layers.resample(w, h, interp);
    tools.rescale(old_size, canvas, interp);
    viewport.set_canvas_size(w, h);

    log_info!(
        "Zoom {:?} (factor {}): canvas {}x{} -> {}x{}, cell size {}",
        direction, canvas.zoom_factor(), old_size.0, old_size.1, w, h, cell
    );
    true
}
