use eframe::egui::{Pos2, Rect, Vec2};
use image::Rgba;

/// Screen region → color lookup supplied by the surrounding UI.
pub trait PaletteLookup {
    /// Color of the swatch under `pos`, if any.
    fn color_at(&self, pos: Pos2) -> Option<Rgba<u8>>;

    /// Every swatch with its screen rectangle, for drawing.
    fn swatches(&self) -> Vec<(Rect, Rgba<u8>)>;
}

/// Rows of the default palette.
const DEFAULT_ROWS: [[[u8; 3]; 6]; 3] = [
    [
        [0, 0, 0],
        [126, 126, 126],
        [194, 194, 194],
        [255, 255, 255],
        [133, 2, 18],
        [241, 26, 41],
    ],
    [
        [109, 148, 187],
        [64, 70, 208],
        [255, 173, 201],
        [255, 201, 15],
        [246, 132, 35],
        [179, 125, 87],
    ],
    [
        [4, 161, 228],
        [152, 218, 232],
        [253, 245, 0],
        [239, 227, 177],
        [184, 227, 33],
        [39, 174, 82],
    ],
];

/// Regular grid of color swatches in the header band.
#[derive(Clone, Debug)]
pub struct SwatchPalette {
    pub origin: Pos2,
    /// Distance between neighbouring swatch origins.
    pub pitch: f32,
    /// Drawn swatch edge (the rest of the pitch is a gap).
    pub swatch_size: f32,
    pub rows: Vec<Vec<Rgba<u8>>>,
}

impl Default for SwatchPalette {
    fn default() -> Self {
        let rows = DEFAULT_ROWS
            .iter()
            .map(|row| row.iter().map(|&[r, g, b]| Rgba([r, g, b, 255])).collect())
            .collect();
        Self {
            origin: Pos2::new(149.0, 13.0),
            pitch: 24.0,
            swatch_size: 22.0,
            rows,
        }
    }
}

impl PaletteLookup for SwatchPalette {
    fn color_at(&self, pos: Pos2) -> Option<Rgba<u8>> {
        let rel = pos - self.origin;
        if rel.x < 0.0 || rel.y < 0.0 {
            return None;
        }
        let col = (rel.x / self.pitch) as usize;
        let row = (rel.y / self.pitch) as usize;
        self.rows.get(row)?.get(col).copied()
    }

    fn swatches(&self) -> Vec<(Rect, Rgba<u8>)> {
        let mut out = Vec::new();
        for (j, row) in self.rows.iter().enumerate() {
            for (i, &color) in row.iter().enumerate() {
                let offset = Vec2::new(i as f32, j as f32) * self.pitch + Vec2::splat(1.0);
                let min = self.origin + offset;
                out.push((Rect::from_min_size(min, Vec2::splat(self.swatch_size)), color));
            }
        }
        out
    }
}
