use std::path::PathBuf;

use crate::ops::transform::Interpolation;

/// Editor settings that persist across sessions.
///
/// Stored as a flat `key=value` file; unknown keys are ignored and missing
/// or malformed values fall back to the defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    pub window_width: u32,
    pub window_height: u32,
    /// Canvas size at zoom level 0
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Brush cell size at zoom level 0
    pub cell_size: u32,
    pub zoom_factor: f64,
    pub min_cell_size: u32,
    pub max_cell_size: u32,
    pub min_canvas_width: u32,
    pub max_canvas_width: u32,
    /// Filter used when layers are resampled on zoom and export
    pub resample_filter: Interpolation,
    /// Layer count above which the two bottom layers are merged
    pub max_layers: usize,
    /// Drop strokes that drew nothing instead of committing an empty layer
    pub discard_empty_strokes: bool,
    pub export_dir: PathBuf,
    pub export_stem: String,
    pub export_width: u32,
    pub export_height: u32,
    pub jpeg_quality: u8,
    /// How many frames the export indicator stays on screen
    pub indicator_frames: u32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            window_width: 1000,
            window_height: 800,
            canvas_width: 960,
            canvas_height: 640,
            cell_size: 12,
            zoom_factor: 2.0,
            min_cell_size: 3,
            max_cell_size: 48,
            min_canvas_width: 240,
            max_canvas_width: 3840,
            resample_filter: Interpolation::Nearest,
            max_layers: 256,
            discard_empty_strokes: false,
            export_dir: PathBuf::from("exports"),
            export_stem: "drawing".to_string(),
            export_width: 1920,
            export_height: 1280,
            jpeg_quality: 90,
            indicator_frames: 120,
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/gridpaint/gridpaint_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\GridPaint\gridpaint_settings.cfg
    /// On macOS:   ~/Library/Application Support/GridPaint/gridpaint_settings.cfg
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("gridpaint");
            Some(config_dir.join("gridpaint_settings.cfg"))
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .ok()?;
            Some(PathBuf::from(appdata).join("GridPaint").join("gridpaint_settings.cfg"))
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("GridPaint")
                    .join("gridpaint_settings.cfg"),
            )
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join("gridpaint_settings.cfg")))
        }
    }

    /// Load settings from disk, or defaults if there is no readable file.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                log_info!("Loaded settings from {}", path.display());
                Self::from_config_str(&content)
            }
            Err(_) => Self::default(),
        }
    }

    /// Save settings to disk.  Failures are logged, never fatal.
    pub fn save(&self) {
        let Some(path) = Self::settings_path() else { return };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(&path, self.to_config_string()) {
            log_warn!("Could not save settings to {}: {}", path.display(), e);
        }
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "window_width={}\n\
             window_height={}\n\
             canvas_width={}\n\
             canvas_height={}\n\
             cell_size={}\n\
             zoom_factor={}\n\
             min_cell_size={}\n\
             max_cell_size={}\n\
             min_canvas_width={}\n\
             max_canvas_width={}\n\
             resample_filter={}\n\
             max_layers={}\n\
             discard_empty_strokes={}\n\
             export_dir={}\n\
             export_stem={}\n\
             export_width={}\n\
             export_height={}\n\
             jpeg_quality={}\n\
             indicator_frames={}\n",
            self.window_width,
            self.window_height,
            self.canvas_width,
            self.canvas_height,
            self.cell_size,
            self.zoom_factor,
            self.min_cell_size,
            self.max_cell_size,
            self.min_canvas_width,
            self.max_canvas_width,
            self.resample_filter.name(),
            self.max_layers,
            self.discard_empty_strokes,
            self.export_dir.display(),
            self.export_stem,
            self.export_width,
            self.export_height,
            self.jpeg_quality,
            self.indicator_frames,
        )
    }

    pub fn from_config_str(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else { continue };
            let value = value.trim();
            match key.trim() {
                "window_width" => parse_into(value, &mut s.window_width),
                "window_height" => parse_into(value, &mut s.window_height),
                "canvas_width" => parse_into(value, &mut s.canvas_width),
                "canvas_height" => parse_into(value, &mut s.canvas_height),
                "cell_size" => parse_into(value, &mut s.cell_size),
                "zoom_factor" => parse_into(value, &mut s.zoom_factor),
                "min_cell_size" => parse_into(value, &mut s.min_cell_size),
                "max_cell_size" => parse_into(value, &mut s.max_cell_size),
                "min_canvas_width" => parse_into(value, &mut s.min_canvas_width),
                "max_canvas_width" => parse_into(value, &mut s.max_canvas_width),
                "resample_filter" => {
                    if let Some(f) = Interpolation::from_name(value) {
                        s.resample_filter = f;
                    }
                }
                "max_layers" => parse_into(value, &mut s.max_layers),
                "discard_empty_strokes" => parse_into(value, &mut s.discard_empty_strokes),
                "export_dir" if !value.is_empty() => s.export_dir = PathBuf::from(value),
                "export_stem" if !value.is_empty() => s.export_stem = value.to_string(),
                "export_width" => parse_into(value, &mut s.export_width),
                "export_height" => parse_into(value, &mut s.export_height),
                "jpeg_quality" => parse_into(value, &mut s.jpeg_quality),
                "indicator_frames" => parse_into(value, &mut s.indicator_frames),
                _ => {}
            }
        }
        s.sanitize();
        s
    }

    /// Restore defaults for values that would break the engine's invariants.
    fn sanitize(&mut self) {
        let d = Self::default();
        if self.cell_size == 0 {
            self.cell_size = d.cell_size;
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            self.canvas_width = d.canvas_width;
            self.canvas_height = d.canvas_height;
        }
        if !(self.zoom_factor.is_finite() && self.zoom_factor > 1.0) {
            self.zoom_factor = d.zoom_factor;
        }
        if self.min_cell_size == 0 || self.min_cell_size > self.max_cell_size {
            self.min_cell_size = d.min_cell_size;
            self.max_cell_size = d.max_cell_size;
        }
        if self.min_canvas_width == 0 || self.min_canvas_width > self.max_canvas_width {
            self.min_canvas_width = d.min_canvas_width;
            self.max_canvas_width = d.max_canvas_width;
        }
        if self.export_width == 0 || self.export_height == 0 {
            self.export_width = d.export_width;
            self.export_height = d.export_height;
        }
        self.max_layers = self.max_layers.max(2);
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
    }
}

fn parse_into<T: std::str::FromStr>(value: &str, slot: &mut T) {
    if let Ok(v) = value.parse::<T>() {
        *slot = v;
    }
}
