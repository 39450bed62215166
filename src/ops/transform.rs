// ============================================================================
// RESAMPLING: scale layer rasters to new canvas dimensions
// ============================================================================

use image::{RgbaImage, imageops};
use rayon::prelude::*;

/// Interpolation method for resample operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Keeps the hard cell edges of the brush grid.
    #[default]
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl Interpolation {
    pub fn name(&self) -> &'static str {
        match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Bilinear => "bilinear",
            Interpolation::Bicubic => "bicubic",
            Interpolation::Lanczos3 => "lanczos3",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|i| i.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn all() -> &'static [Interpolation] {
        &[
            Interpolation::Nearest,
            Interpolation::Bilinear,
            Interpolation::Bicubic,
            Interpolation::Lanczos3,
        ]
    }

    pub fn to_filter(&self) -> imageops::FilterType {
        match self {
            Interpolation::Nearest => imageops::FilterType::Nearest,
            Interpolation::Bilinear => imageops::FilterType::Triangle,
            Interpolation::Bicubic => imageops::FilterType::CatmullRom,
            Interpolation::Lanczos3 => imageops::FilterType::Lanczos3,
        }
    }
}

/// Resample a raster to exactly `new_w`×`new_h`.  Same-size input is cloned
/// untouched so no filter error creeps in.
pub fn resample(img: &RgbaImage, new_w: u32, new_h: u32, interp: Interpolation) -> RgbaImage {
    if img.width() == new_w && img.height() == new_h {
        return img.clone();
    }
    imageops::resize(img, new_w.max(1), new_h.max(1), interp.to_filter())
}

/// Resample every raster in place.  Layers are independent, so the work is
/// spread over the rayon pool; the call itself stays synchronous.
pub fn resample_all(images: &mut [&mut RgbaImage], new_w: u32, new_h: u32, interp: Interpolation) {
    images.par_iter_mut().for_each(|img| {
        let resized = resample(&**img, new_w, new_h, interp);
        **img = resized;
    });
}
