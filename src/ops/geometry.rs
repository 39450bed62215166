// ============================================================================
// GEOMETRY: screen ↔ canvas cell coordinates
// ============================================================================

use eframe::egui::Pos2;

use crate::viewport::Viewport;

/// Top-left corner of the grid cell containing canvas point `(x, y)`.
/// Floors toward negative infinity so points left/above the canvas map to
/// negative cells instead of folding onto cell 0.  Corners past the `i32`
/// range saturate; they still index the same cell.
#[inline]
pub fn snap_to_cell(x: i32, y: i32, cell: u32) -> (i32, i32) {
    let (ix, iy) = cell_index(x, y, cell);
    cell_origin(ix, iy, cell)
}

/// Grid index of the cell containing a canvas point.
#[inline]
pub fn cell_index(x: i32, y: i32, cell: u32) -> (i32, i32) {
    let c = cell.max(1) as i32;
    (x.div_euclid(c), y.div_euclid(c))
}

/// Canvas coordinates of a grid index's top-left corner.
#[inline]
pub fn cell_origin(ix: i32, iy: i32, cell: u32) -> (i32, i32) {
    let c = cell.max(1) as i64;
    let origin = |i: i32| (i as i64 * c).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
    (origin(ix), origin(iy))
}

/// Map a pointer position to the canvas cell under it: remove the canvas
/// anchor, add the pan offset, then quantize to the brush grid.
///
/// Always defined; cells outside the canvas are clipped by the writers.
pub fn to_canvas(screen: Pos2, viewport: &Viewport, cell: u32) -> (i32, i32) {
    let anchor = viewport.anchor();
    let pan = viewport.pan();
    let x = (screen.x - anchor.x + pan.x).floor() as i32;
    let y = (screen.y - anchor.y + pan.y).floor() as i32;
    snap_to_cell(x, y, cell)
}
