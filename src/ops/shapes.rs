// ============================================================================
// SHAPE RASTERIZER: line / rectangle / ellipse / arc on the brush grid
// ============================================================================
//
// Every primitive takes canvas-space endpoints and the current cell size and
// returns the top-left corners of the cells to fill, in drawing order.

use std::f64::consts::{PI, TAU};

use crate::ops::geometry::{cell_index, cell_origin, snap_to_cell};

/// Angular step for arc sampling, in radians.
pub const ARC_STEP: f64 = 0.01;
/// Number of samples around an ellipse (one per degree).
pub const ELLIPSE_SAMPLES: u32 = 360;

/// Absorbs float noise so a sample that lands exactly on a cell boundary
/// does not fall into the previous cell.
const SNAP_EPSILON: f64 = 1e-6;

// ----------------------------------------------------------------------------
// Line
// ----------------------------------------------------------------------------

/// Inclusive range of grid indices a clipped primitive may emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellWindow {
    pub min: (i32, i32),
    pub max: (i32, i32),
}

impl CellWindow {
    pub const UNBOUNDED: CellWindow = CellWindow {
        min: (i32::MIN, i32::MIN),
        max: (i32::MAX, i32::MAX),
    };

    /// Every cell that overlaps a `width`×`height` canvas.
    pub fn covering(width: u32, height: u32, cell: u32) -> Self {
        let c = cell.max(1);
        let cols = width.div_ceil(c).max(1).min(i32::MAX as u32) as i32;
        let rows = height.div_ceil(c).max(1).min(i32::MAX as u32) as i32;
        Self {
            min: (0, 0),
            max: (cols - 1, rows - 1),
        }
    }

    pub fn contains(&self, index: (i32, i32)) -> bool {
        (self.min.0..=self.max.0).contains(&index.0)
            && (self.min.1..=self.max.1).contains(&index.1)
    }
}

/// Digital line from `p1` to `p2`, one cell per step along the dominant axis.
///
/// The walk always starts from the lexicographically smaller grid endpoint,
/// so `line(a, b)` is exactly `line(b, a)` reversed.
pub fn line(p1: (i32, i32), p2: (i32, i32), cell: u32) -> Vec<(i32, i32)> {
    line_clipped(p1, p2, cell, CellWindow::UNBOUNDED)
}

/// The cells of `line(p1, p2, cell)` whose grid index lies in `window`, in
/// the same order.  Work is proportional to the window, not to the distance
/// between the endpoints.
pub fn line_clipped(
    p1: (i32, i32),
    p2: (i32, i32),
    cell: u32,
    window: CellWindow,
) -> Vec<(i32, i32)> {
    let a = cell_index(p1.0, p1.1, cell);
    let b = cell_index(p2.0, p2.1, cell);
    let (from, to, reversed) = if a <= b { (a, b, false) } else { (b, a, true) };

    let mut cells: Vec<(i32, i32)> = grid_line(from, to, window)
        .into_iter()
        .map(|(ix, iy)| cell_origin(ix, iy, cell))
        .collect();
    if reversed {
        cells.reverse();
    }
    cells
}

/// Integer line between grid indices, endpoints included, restricted to
/// `window`.  All arithmetic is widened so any pair of `i32` endpoints works.
fn grid_line(from: (i32, i32), to: (i32, i32), window: CellWindow) -> Vec<(i32, i32)> {
    let dx = to.0 as i64 - from.0 as i64;
    let dy = to.1 as i64 - from.1 as i64;
    let steps = dx.abs().max(dy.abs());
    if steps == 0 {
        return if window.contains(from) { vec![from] } else { Vec::new() };
    }

    let x_major = dx.abs() >= dy.abs();
    let (major_from, major_delta, lo, hi) = if x_major {
        (from.0 as i64, dx, window.min.0 as i64, window.max.0 as i64)
    } else {
        (from.1 as i64, dy, window.min.1 as i64, window.max.1 as i64)
    };
    // The major coordinate moves by exactly one per step, so the steps that
    // land inside the window form one contiguous range
    let (t_lo, t_hi) = if major_delta > 0 {
        (lo - major_from, hi - major_from)
    } else {
        (major_from - hi, major_from - lo)
    };
    let (t0, t1) = (t_lo.max(0), t_hi.min(steps));
    if t0 > t1 {
        return Vec::new();
    }

    let mut out = Vec::with_capacity((t1 - t0 + 1) as usize);
    for t in t0..=t1 {
        let (x, y) = if x_major {
            (from.0 as i64 + dx.signum() * t, from.1 as i64 + round_div(t, dy, steps))
        } else {
            (from.0 as i64 + round_div(t, dx, steps), from.1 as i64 + dy.signum() * t)
        };
        let index = (x as i32, y as i32);
        if window.contains(index) {
            out.push(index);
        }
    }
    out
}

/// `t * delta / steps` rounded to nearest, halves toward +∞.  `steps` must
/// be positive.
#[inline]
fn round_div(t: i64, delta: i64, steps: i64) -> i64 {
    let (num, den) = (t as i128 * delta as i128, steps as i128);
    (2 * num + den).div_euclid(2 * den) as i64
}

fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

// ----------------------------------------------------------------------------
// Rectangle
// ----------------------------------------------------------------------------

/// Closed rectangle outline spanned by `p1` and `p2`.
///
/// Width and height are truncated toward zero to whole cells.  With
/// `constrain_square` both sides take the smaller magnitude and keep their
/// own direction.  The sequence starts and ends on the `p1` corner.
pub fn rectangle(
    p1: (i32, i32),
    p2: (i32, i32),
    constrain_square: bool,
    cell: u32,
) -> Vec<(i32, i32)> {
    rectangle_clipped(p1, p2, constrain_square, cell, CellWindow::UNBOUNDED)
}

/// `rectangle` restricted to the cells inside `window`.
pub fn rectangle_clipped(
    p1: (i32, i32),
    p2: (i32, i32),
    constrain_square: bool,
    cell: u32,
    window: CellWindow,
) -> Vec<(i32, i32)> {
    let c = cell.max(1) as i64;
    let (x1, y1) = snap_to_cell(p1.0, p1.1, cell);
    let mut w = (p2.0 as i64 - x1 as i64) / c * c;
    let mut h = (p2.1 as i64 - y1 as i64) / c * c;
    if constrain_square {
        let m = w.abs().min(h.abs());
        w = if w < 0 { -m } else { m };
        h = if h < 0 { -m } else { m };
    }

    let (x2, y2) = (saturate(x1 as i64 + w), saturate(y1 as i64 + h));
    let corners = [(x1, y1), (x2, y1), (x2, y2), (x1, y2)];
    let mut cells = Vec::new();
    for i in 0..4 {
        let edge = line_clipped(corners[i], corners[(i + 1) % 4], cell, window);
        // Shared corner already emitted by the previous edge
        let skip = usize::from(i > 0 && cells.last() == edge.first());
        cells.extend(edge.into_iter().skip(skip));
    }
    cells
}

// ----------------------------------------------------------------------------
// Ellipse
// ----------------------------------------------------------------------------

/// Ellipse outline inscribed in the box spanned by `p1` and `p2`, sampled
/// once per degree.  With `constrain_circle` both semi-axes take the smaller
/// magnitude, growing from `p1` in the drag direction.
pub fn ellipse(
    p1: (i32, i32),
    p2: (i32, i32),
    constrain_circle: bool,
    cell: u32,
) -> Vec<(i32, i32)> {
    let mut a = (p2.0 as f64 - p1.0 as f64) / 2.0;
    let mut b = (p2.1 as f64 - p1.1 as f64) / 2.0;
    if constrain_circle {
        let m = a.abs().min(b.abs());
        a = m.copysign(a);
        b = m.copysign(b);
    }
    let cx = p1.0 as f64 + a;
    let cy = p1.1 as f64 + b;

    let mut cells = Vec::with_capacity(ELLIPSE_SAMPLES as usize);
    for deg in 0..ELLIPSE_SAMPLES {
        let theta = (deg as f64).to_radians();
        push_sample(&mut cells, cx + a * theta.cos(), cy + b * theta.sin(), cell);
    }
    cells
}

// ----------------------------------------------------------------------------
// Arc
// ----------------------------------------------------------------------------

/// Half-circle whose diameter runs from `p1` to `p2`, swept with increasing
/// angle.  `reverse_direction` turns both end angles by π, selecting the
/// other half.
pub fn arc(
    p1: (i32, i32),
    p2: (i32, i32),
    reverse_direction: bool,
    cell: u32,
) -> Vec<(i32, i32)> {
    let (x1, y1) = (p1.0 as f64, p1.1 as f64);
    let (x2, y2) = (p2.0 as f64, p2.1 as f64);
    let cx = (x1 + x2) / 2.0;
    let cy = (y1 + y2) / 2.0;
    let radius = (x2 - x1).hypot(y2 - y1) / 2.0;

    let mut start = (y1 - cy).atan2(x1 - cx);
    let mut end = (y2 - cy).atan2(x2 - cx);
    if reverse_direction {
        start += PI;
        end += PI;
    }
    if end < start {
        end += TAU;
    }

    let mut cells = Vec::new();
    let steps = ((end - start) / ARC_STEP).floor() as u64;
    for i in 0..=steps {
        let theta = start + i as f64 * ARC_STEP;
        push_sample(&mut cells, cx + radius * theta.cos(), cy + radius * theta.sin(), cell);
    }
    if (steps as f64) * ARC_STEP < end - start {
        push_sample(&mut cells, cx + radius * end.cos(), cy + radius * end.sin(), cell);
    }
    cells
}

/// Quantize a sample and append it unless it repeats the previous cell.
fn push_sample(cells: &mut Vec<(i32, i32)>, x: f64, y: f64, cell: u32) {
    let px = (x + SNAP_EPSILON).floor() as i32;
    let py = (y + SNAP_EPSILON).floor() as i32;
    let c = snap_to_cell(px, py, cell);
    if cells.last() != Some(&c) {
        cells.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn bounds(cells: &[(i32, i32)]) -> (i32, i32, i32, i32) {
        let min_x = cells.iter().map(|c| c.0).min().unwrap();
        let max_x = cells.iter().map(|c| c.0).max().unwrap();
        let min_y = cells.iter().map(|c| c.1).min().unwrap();
        let max_y = cells.iter().map(|c| c.1).max().unwrap();
        (min_x, min_y, max_x, max_y)
    }

    #[test]
    fn test_horizontal_line_scenario() {
        let cells = line((0, 0), (100, 0), 10);
        let expected: Vec<(i32, i32)> = (0..=10).map(|i| (i * 10, 0)).collect();
        assert_eq!(cells, expected);
    }

    #[test]
    fn test_line_is_swap_symmetric() {
        let pairs = [
            ((0, 0), (70, 30)),
            ((0, 0), (30, 70)),
            ((-40, 12), (95, -60)),
            ((5, 5), (6, 80)),
            ((0, 0), (20, 10)),
            ((13, 0), (0, 13)),
        ];
        for (a, b) in pairs {
            for cell in [1, 3, 10] {
                let fwd = line(a, b, cell);
                let mut back = line(b, a, cell);
                back.reverse();
                assert_eq!(fwd, back, "{:?} -> {:?} at cell {}", a, b, cell);
                let fs: HashSet<_> = fwd.into_iter().collect();
                let bs: HashSet<_> = line(b, a, cell).into_iter().collect();
                assert_eq!(fs, bs);
            }
        }
    }

    #[test]
    fn test_degenerate_line_is_one_cell() {
        assert_eq!(line((37, 41), (37, 41), 12), vec![(36, 36)]);
        assert_eq!(line((37, 41), (40, 46), 12), vec![(36, 36)]);
    }

    #[test]
    fn test_line_is_connected() {
        let cells = line((0, 0), (57, -23), 1);
        for w in cells.windows(2) {
            assert!((w[0].0 - w[1].0).abs() <= 1 && (w[0].1 - w[1].1).abs() <= 1);
        }
        assert_eq!(cells.len(), 58);
    }

    #[test]
    fn test_square_rectangle_is_closed_and_square() {
        for (p1, p2) in [((0, 0), (100, 40)), ((50, 50), (-20, 10)), ((0, 0), (-30, 90))] {
            let cells = rectangle(p1, p2, true, 10);
            assert_eq!(cells.first(), cells.last());
            let (min_x, min_y, max_x, max_y) = bounds(&cells);
            assert_eq!(max_x - min_x, max_y - min_y);
        }
    }

    #[test]
    fn test_rectangle_truncates_to_cells() {
        let cells = rectangle((0, 0), (45, 27), false, 10);
        assert_eq!(bounds(&cells), (0, 0, 40, 20));
        // 5 + 3 + 5 + 3 cells around a 5×3 box, closing corner repeated once
        assert_eq!(cells.len(), 13);
        assert_eq!(cells.first(), cells.last());
    }

    #[test]
    fn test_ellipse_fits_its_box() {
        let cells = ellipse((0, 0), (100, 60), false, 1);
        assert_eq!(bounds(&cells), (0, 0, 100, 60));
    }

    #[test]
    fn test_circle_takes_smaller_axis() {
        let cells = ellipse((0, 0), (100, 40), true, 1);
        assert_eq!(bounds(&cells), (0, 0, 40, 40));
        let flipped = ellipse((0, 0), (-100, 40), true, 1);
        assert_eq!(bounds(&flipped), (-40, 0, 0, 40));
    }

    #[test]
    fn test_zero_radius_shapes_are_single_cells() {
        assert_eq!(ellipse((24, 24), (24, 24), false, 12), vec![(24, 24)]);
        assert_eq!(arc((24, 24), (24, 24), false, 12), vec![(24, 24)]);
        assert_eq!(rectangle((24, 24), (24, 24), false, 12), vec![(24, 24)]);
    }

    #[test]
    fn test_arc_runs_between_endpoints() {
        let cells = arc((0, 0), (100, 0), false, 10);
        assert_eq!(cells.first(), Some(&(0, 0)));
        assert_eq!(cells.last(), Some(&(100, 0)));
        assert!(cells.iter().all(|c| c.1 <= 0));
        assert_eq!(bounds(&cells).1, -50);
    }

    #[test]
    fn test_reversed_arc_takes_other_half() {
        let cells = arc((0, 0), (100, 0), true, 10);
        assert_eq!(cells.first(), Some(&(100, 0)));
        assert_eq!(cells.last(), Some(&(0, 0)));
        assert!(cells.iter().all(|c| c.1 >= 0));
        assert!(bounds(&cells).3 >= 40);
    }

    #[test]
    fn test_extreme_endpoints_do_not_overflow() {
        let window = CellWindow::covering(10, 10, 1);
        assert_eq!(line_clipped((0, 0), (i32::MIN, 0), 1, window), vec![(0, 0)]);
        assert_eq!(line_clipped((i32::MIN, 0), (0, 0), 1, window), vec![(0, 0)]);

        let diagonal = line_clipped((i32::MIN, i32::MIN), (i32::MAX, i32::MAX), 1, window);
        let expected: Vec<(i32, i32)> = (0..10).map(|i| (i, i)).collect();
        assert_eq!(diagonal, expected);

        let square = rectangle_clipped((i32::MIN, i32::MIN), (i32::MAX, i32::MAX), true, 1, window);
        assert!(square.is_empty());
        assert!(ellipse((i32::MIN, i32::MIN), (i32::MAX, i32::MAX), true, 1).len() <= 360);
    }

    #[test]
    fn test_clipped_line_work_is_bounded_by_window() {
        let window = CellWindow::covering(960, 640, 12);
        assert_eq!(window.max, (79, 53));
        let cells = line_clipped((0, 0), (120_000_000, 0), 12, window);
        assert_eq!(cells.len(), 80);
        assert_eq!(cells.last(), Some(&(948, 0)));

        // Clipping keeps exactly the visible part of the full line
        let full = line((-500, -37), (1500, 700), 12);
        let visible: Vec<_> = full
            .into_iter()
            .filter(|&(x, y)| window.contains((x.div_euclid(12), y.div_euclid(12))))
            .collect();
        assert_eq!(line_clipped((-500, -37), (1500, 700), 12, window), visible);
    }

    #[test]
    fn test_clipped_rectangle_keeps_visible_edges() {
        let window = CellWindow::covering(100, 100, 10);
        let cells = rectangle_clipped((50, 50), (-1_000_000, -1_000_000), false, 10, window);
        assert_eq!(cells.first(), Some(&(50, 50)));
        assert!(cells.iter().all(|&(x, y)| (0..=50).contains(&x) && (0..=50).contains(&y)));
        // Two visible edges of six cells each; the outline closes on (50, 50)
        assert_eq!(cells.len(), 12);
        assert_eq!(cells.last(), Some(&(50, 50)));
    }
}
