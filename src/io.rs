use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageError, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::canvas::Layer;
use crate::compositor::{self, SHEET};
use crate::settings::AppSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    /// Opaque formats are composited onto the white sheet; PNG keeps alpha.
    pub fn is_opaque(&self) -> bool {
        matches!(self, ExportFormat::Jpeg)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Encode(ImageError),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "I/O error: {}", e),
            ExportError::Encode(e) => write!(f, "Encode error: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl From<ImageError> for ExportError {
    fn from(e: ImageError) -> Self {
        ExportError::Encode(e)
    }
}

/// First `<dir>/<stem>_<n>.<ext>` with `n >= 1` that does not exist yet.
pub fn next_export_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let mut n: u64 = 1;
    loop {
        let candidate = dir.join(format!("{}_{}.{}", stem, n, ext));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Encode an RGBA image and write it to `path`.  JPEG drops the alpha
/// channel, so callers composite onto an opaque background first.
pub fn encode_and_write(
    image: &RgbaImage,
    path: &Path,
    format: ExportFormat,
    quality: u8,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        ExportFormat::Png => {
            let encoder = PngEncoder::new(&mut writer);
            #[allow(deprecated)]
            encoder.encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )?;
        }
        ExportFormat::Jpeg => {
            let rgb_image = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
            encoder.encode(
                rgb_image.as_raw(),
                rgb_image.width(),
                rgb_image.height(),
                image::ColorType::Rgb8,
            )?;
        }
    }
    Ok(())
}

/// Flatten `layers` at the configured export resolution and write them to
/// the next free numbered file in the export directory.
pub fn export(
    layers: &[Layer],
    settings: &AppSettings,
    format: ExportFormat,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(&settings.export_dir)?;
    let background = format.is_opaque().then_some(SHEET);
    let image = compositor::flatten(
        layers,
        settings.export_width,
        settings.export_height,
        background,
        settings.resample_filter,
    );
    let path = next_export_path(&settings.export_dir, &settings.export_stem, format.extension());
    encode_and_write(&image, &path, format, settings.jpeg_quality)?;
    Ok(path)
}

/// Transient export result shown in the header for a fixed number of frames.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportStatus {
    pub ok: bool,
    pub message: String,
    frames_left: u32,
}

impl ExportStatus {
    pub fn from_result(result: &Result<PathBuf, ExportError>, frames: u32) -> Self {
        match result {
            Ok(path) => Self {
                ok: true,
                message: format!("Saved {}", path.display()),
                frames_left: frames,
            },
            Err(e) => Self {
                ok: false,
                message: format!("Export failed: {}", e),
                frames_left: frames,
            },
        }
    }

    pub fn frames_left(&self) -> u32 {
        self.frames_left
    }

    /// Count down one frame.  Returns false once the indicator has expired.
    pub fn tick(&mut self) -> bool {
        self.frames_left = self.frames_left.saturating_sub(1);
        self.frames_left > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::fill_cell;
    use image::Rgba;

    fn settings_in(dir: &Path) -> AppSettings {
        AppSettings {
            export_dir: dir.join("out"),
            export_width: 64,
            export_height: 48,
            ..AppSettings::default()
        }
    }

    #[test]
    fn test_numbering_skips_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let next = |ext: &str| next_export_path(dir.path(), "drawing", ext);
        assert_eq!(next("png"), dir.path().join("drawing_1.png"));
        std::fs::write(dir.path().join("drawing_1.png"), b"x").unwrap();
        std::fs::write(dir.path().join("drawing_2.png"), b"x").unwrap();
        assert_eq!(next("png"), dir.path().join("drawing_3.png"));
        assert_eq!(next("jpg"), dir.path().join("drawing_1.jpg"));
    }

    #[test]
    fn test_export_without_layers_writes_background() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let path = export(&[], &settings, ExportFormat::Jpeg).unwrap();
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (64, 48));
        let p = img.get_pixel(10, 10);
        assert!(p[0] > 240 && p[1] > 240 && p[2] > 240);

        let path = export(&[], &settings, ExportFormat::Png).unwrap();
        let img = image::open(&path).unwrap().to_rgba8();
        assert!(img.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_export_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let first = export(&[], &settings, ExportFormat::Png).unwrap();
        let second = export(&[], &settings, ExportFormat::Png).unwrap();
        assert_ne!(first, second);
        assert!(first.exists() && second.exists());
    }

    #[test]
    fn test_export_scales_layers() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        let mut layer = Layer::new("a".into(), 32, 24);
        fill_cell(&mut layer.pixels, 0, 0, 8, Rgba([255, 0, 0, 255]));
        let path = export(&[layer], &settings, ExportFormat::Png).unwrap();
        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(*img.get_pixel(15, 15), Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(17, 17)[3], 0);
    }

    #[test]
    fn test_failure_becomes_status() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the export directory should be
        let blocker = dir.path().join("out");
        std::fs::write(&blocker, b"x").unwrap();
        let result = export(&[], &settings_in(dir.path()), ExportFormat::Png);
        assert!(matches!(result, Err(ExportError::Io(_))));
        let mut status = ExportStatus::from_result(&result, 2);
        assert!(!status.ok);
        assert!(status.tick());
        assert!(!status.tick());
        assert_eq!(status.frames_left(), 0);
    }
}
