use image::{Rgba, RgbaImage};

/// Fully transparent pixel written by the eraser and used for fresh buffers.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

// ============================================================================
// CANVAS GEOMETRY
// ============================================================================

/// Logical drawing surface: pixel dimensions plus the brush cell size.
///
/// The current geometry is always derived from the base geometry and an
/// integer zoom level, so dimensions and cell size can only ever change
/// together and a zoom in/out pair lands back on the exact same numbers.
#[derive(Clone, Debug, PartialEq)]
pub struct Canvas {
    base_width: u32,
    base_height: u32,
    base_cell_size: u32,
    zoom_factor: f64,
    zoom_level: i32,
    width: u32,
    height: u32,
    cell_size: u32,
}

impl Canvas {
    pub fn new(width: u32, height: u32, cell_size: u32, zoom_factor: f64) -> Self {
        let zoom_factor = if zoom_factor.is_finite() && zoom_factor > 1.0 {
            zoom_factor
        } else {
            2.0
        };
        Self {
            base_width: width.max(1),
            base_height: height.max(1),
            base_cell_size: cell_size.max(1),
            zoom_factor,
            zoom_level: 0,
            width: width.max(1),
            height: height.max(1),
            cell_size: cell_size.max(1),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    /// Positive levels are zoomed in (smaller canvas), negative zoomed out.
    pub fn zoom_level(&self) -> i32 {
        self.zoom_level
    }

    /// `(width, height, cell_size)` the canvas would have at `level`.
    pub fn geometry_at(&self, level: i32) -> (u32, u32, u32) {
        let scale = self.zoom_factor.powi(-level);
        let apply = |v: u32| ((v as f64 * scale).round() as u32).max(1);
        (apply(self.base_width), apply(self.base_height), apply(self.base_cell_size))
    }

    /// Move to `level`, updating dimensions and cell size in one step.
    pub fn set_zoom_level(&mut self, level: i32) {
        let (w, h, cell) = self.geometry_at(level);
        self.zoom_level = level;
        self.width = w;
        self.height = h;
        self.cell_size = cell;
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }
}

// ============================================================================
// RASTER HELPERS
// ============================================================================

/// Fill the `size`×`size` square whose top-left corner is `(x, y)`, clipped to
/// the image bounds.  Returns true if at least one pixel was written.
pub fn fill_cell(img: &mut RgbaImage, x: i32, y: i32, size: u32, color: Rgba<u8>) -> bool {
    let (w, h) = img.dimensions();
    let x0 = x.max(0) as i64;
    let y0 = y.max(0) as i64;
    let x1 = (x as i64 + size as i64).min(w as i64);
    let y1 = (y as i64 + size as i64).min(h as i64);
    if x0 >= x1 || y0 >= y1 {
        return false;
    }
    for py in y0..y1 {
        for px in x0..x1 {
            img.put_pixel(px as u32, py as u32, color);
        }
    }
    true
}

/// Pixel at canvas coordinates, `None` outside the image.
pub fn pixel_at(img: &RgbaImage, x: i32, y: i32) -> Option<Rgba<u8>> {
    if x < 0 || y < 0 || x as u32 >= img.width() || y as u32 >= img.height() {
        return None;
    }
    Some(*img.get_pixel(x as u32, y as u32))
}

// ============================================================================
// LAYER
// ============================================================================

/// One committed raster contribution, sized exactly to the canvas.
#[derive(Clone, Debug)]
pub struct Layer {
    pub name: String,
    pub pixels: RgbaImage,
}

impl Layer {
    pub fn new(name: String, width: u32, height: u32) -> Self {
        Self {
            name,
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
        }
    }

    pub fn from_pixels(name: String, pixels: RgbaImage) -> Self {
        Self { name, pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Overwrite one cell with fully transparent pixels.
    pub fn erase_cell(&mut self, x: i32, y: i32, size: u32) {
        fill_cell(&mut self.pixels, x, y, size, TRANSPARENT);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        pixel_at(&self.pixels, x, y)
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| p[3] == 0)
    }
}

// ============================================================================
// STROKE BUFFER
// ============================================================================

/// The raster edit currently being drawn, alive from pointer-down to
/// pointer-up.
#[derive(Clone, Debug)]
pub struct StrokeBuffer {
    pub pixels: RgbaImage,
    /// Set once any cell landed inside the buffer.
    painted: bool,
}

impl StrokeBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
            painted: false,
        }
    }

    pub fn fill_cells(&mut self, cells: &[(i32, i32)], size: u32, color: Rgba<u8>) {
        for &(x, y) in cells {
            if fill_cell(&mut self.pixels, x, y, size, color) {
                self.painted = true;
            }
        }
    }

    /// Wipe the buffer back to transparent (shape tools re-render every move).
    pub fn clear(&mut self) {
        for p in self.pixels.pixels_mut() {
            *p = TRANSPARENT;
        }
        self.painted = false;
    }

    pub fn is_painted(&self) -> bool {
        self.painted
    }

    pub fn into_layer(self, name: String) -> Layer {
        Layer::from_pixels(name, self.pixels)
    }
}
