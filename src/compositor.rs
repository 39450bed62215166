// ============================================================================
// COMPOSITOR: per-frame window image and flattened export image
// ============================================================================

use eframe::egui::{Pos2, Rect, Vec2};
use image::{Rgba, RgbaImage, imageops};
use rayon::prelude::*;

use crate::canvas::{Layer, StrokeBuffer, TRANSPARENT};
use crate::components::colors::PaletteLookup;
use crate::components::layers::LayerStack;
use crate::components::toolbar::ToolbarLayout;
use crate::components::tools::Tool;
use crate::ops::transform::{self, Interpolation};
use crate::viewport::{Axis, GUTTER, Viewport};

pub const BACKGROUND: Rgba<u8> = Rgba([202, 211, 226, 255]);
pub const HEADER_BAND: Rgba<u8> = Rgba([245, 246, 248, 255]);
pub const SHEET: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const SEPARATOR: Rgba<u8> = Rgba([164, 168, 177, 255]);
pub const SCROLLBAR_IDLE: Rgba<u8> = Rgba([164, 168, 177, 255]);
pub const SCROLLBAR_ACTIVE: Rgba<u8> = Rgba([100, 104, 112, 255]);
pub const BUTTON_FACE: Rgba<u8> = Rgba([228, 231, 236, 255]);
pub const BUTTON_ACTIVE: Rgba<u8> = Rgba([186, 200, 226, 255]);

pub const HEADER_HEIGHT: f32 = 100.0;

/// Screen rectangle of the current-color swatch.
pub fn color_swatch_rect() -> Rect {
    Rect::from_min_size(Pos2::new(309.0, 59.0), Vec2::splat(24.0))
}

/// Everything one frame needs, borrowed from the session.
pub struct Frame<'a> {
    pub layers: &'a LayerStack,
    pub stroke: Option<&'a StrokeBuffer>,
    pub viewport: &'a Viewport,
    pub color: Rgba<u8>,
    pub tool: Tool,
    pub palette: &'a dyn PaletteLookup,
    pub toolbar: &'a dyn ToolbarLayout,
}

/// Paint a whole window-sized frame.  Text (button labels, export status)
/// is left to the UI layer.
pub fn render_frame(frame: &Frame<'_>) -> RgbaImage {
    let vp = frame.viewport;
    let (ww, wh) = vp.window_size();
    let mut out = RgbaImage::from_pixel(ww.max(1), wh.max(1), BACKGROUND);

    // Canvas view, clipped to the drawable area
    let drawable = vp.drawable_size();
    let (dw, dh) = (drawable.x as u32, drawable.y as u32);
    if dw > 0 && dh > 0 {
        let mut view = RgbaImage::from_pixel(dw, dh, BACKGROUND);
        let offset = vp.canvas_origin_on_screen() - vp.anchor();
        let (ox, oy) = (offset.x.round() as i64, offset.y.round() as i64);
        let (cw, ch) = vp.canvas_size();
        fill_rect(
            &mut view,
            Rect::from_min_size(Pos2::new(ox as f32, oy as f32), Vec2::new(cw as f32, ch as f32)),
            SHEET,
        );
        for layer in frame.layers.layers() {
            imageops::overlay(&mut view, &layer.pixels, ox, oy);
        }
        if let Some(stroke) = frame.stroke {
            imageops::overlay(&mut view, &stroke.pixels, ox, oy);
        }
        let anchor = vp.anchor();
        imageops::overlay(&mut out, &view, anchor.x as i64, anchor.y as i64);
    }

    draw_chrome(&mut out, frame);
    draw_scrollbars(&mut out, vp);
    out
}

fn draw_chrome(out: &mut RgbaImage, frame: &Frame<'_>) {
    let width = out.width() as f32;
    fill_rect(out, Rect::from_min_size(Pos2::ZERO, Vec2::new(width, HEADER_HEIGHT)), HEADER_BAND);

    for (rect, color) in frame.palette.swatches() {
        fill_rect(out, rect, color);
    }

    for (rect, tool) in frame.toolbar.buttons() {
        fill_rect(out, rect.expand(1.0), SEPARATOR);
        let face = if tool == frame.tool { BUTTON_ACTIVE } else { BUTTON_FACE };
        fill_rect(out, rect, face);
    }

    let swatch = color_swatch_rect();
    fill_rect(out, swatch.expand(1.0), SEPARATOR);
    fill_rect(out, swatch, frame.color);

    let separator = Rect::from_min_size(Pos2::new(0.0, HEADER_HEIGHT), Vec2::new(width, 1.0));
    fill_rect(out, separator, SEPARATOR);
}

fn draw_scrollbars(out: &mut RgbaImage, vp: &Viewport) {
    let (w, h) = (out.width() as f32, out.height() as f32);
    // Gutters
    fill_rect(out, Rect::from_min_max(Pos2::new(0.0, h - GUTTER), Pos2::new(w, h)), BACKGROUND);
    fill_rect(
        out,
        Rect::from_min_max(Pos2::new(w - GUTTER, HEADER_HEIGHT + 1.0), Pos2::new(w, h)),
        BACKGROUND,
    );

    for (axis, bar) in [(Axis::Vertical, &vp.right_bar), (Axis::Horizontal, &vp.bottom_bar)] {
        if !bar.visible {
            continue;
        }
        let color = if bar.is_active() { SCROLLBAR_ACTIVE } else { SCROLLBAR_IDLE };
        fill_rect(out, vp.bar_rect(axis), color);
    }
}

/// Fill a screen rectangle, clipped to the image.
fn fill_rect(img: &mut RgbaImage, rect: Rect, color: Rgba<u8>) {
    let x0 = (rect.min.x.round() as i64).max(0);
    let y0 = (rect.min.y.round() as i64).max(0);
    let x1 = (rect.max.x.round() as i64).min(img.width() as i64);
    let y1 = (rect.max.y.round() as i64).min(img.height() as i64);
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Flatten the stack to `width`×`height`: every layer is resampled to the
/// target size and composited in stack order over `background`
/// (`None` keeps the result transparent).
pub fn flatten(
    layers: &[Layer],
    width: u32,
    height: u32,
    background: Option<Rgba<u8>>,
    interp: Interpolation,
) -> RgbaImage {
    let mut out = RgbaImage::from_pixel(width, height, background.unwrap_or(TRANSPARENT));
    let scaled: Vec<RgbaImage> = layers
        .par_iter()
        .map(|layer| transform::resample(&layer.pixels, width, height, interp))
        .collect();
    for img in &scaled {
        imageops::overlay(&mut out, img, 0, 0);
    }
    out
}
