use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use levelplot::{
    CompressorCurveParams, CurveStyle, DbRange, GainReductionStyle, PixelFrame, Resolution,
    ThresholdStyle,
};

use crate::LevelPlotApp;

/// Returns the path to the settings file: `~/.config/levelplot-rs/settings.json`
fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("levelplot-rs");
    path.push("settings.json");
    path
}

/// Persisted application settings.
///
/// Serialized as JSON to the platform config directory.
/// Fields use `#[serde(default)]` so that adding new settings
/// won't break existing config files.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub show_settings: bool,

    // Plot layout
    pub resolution: Resolution,
    pub db_range: DbRange,
    pub headroom_db: f64,
    pub time_scale_secs: f64,

    // Compressor readouts
    pub compressor: CompressorCurveParams,

    // Styles
    pub gain_reduction: GainReductionStyle,
    pub curve: CurveStyle,
    pub threshold: ThresholdStyle,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            show_settings: true,

            resolution: Resolution::default(),
            db_range: DbRange::default(),
            headroom_db: levelplot::config::DEFAULT_HEADROOM_DB,
            time_scale_secs: levelplot::config::DEFAULT_TIME_SCALE,

            compressor: CompressorCurveParams::default(),

            gain_reduction: GainReductionStyle::default(),
            curve: CurveStyle::default(),
            threshold: ThresholdStyle::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from disk, falling back to defaults on any error.
    pub fn load() -> Self {
        let path = settings_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Failed to parse settings ({}), using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::info!("No settings file found ({}), using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to disk as pretty JSON.
    pub fn save(&self) {
        let path = settings_path();
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::warn!("Failed to create config directory: {}", e);
                return;
            }
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    log::warn!("Failed to write settings: {}", e);
                } else {
                    log::info!("Saved settings to {}", path.display());
                }
            }
            Err(e) => {
                log::warn!("Failed to serialize settings: {}", e);
            }
        }
    }

    /// Extract current settings from the running application.
    pub fn from_app(app: &LevelPlotApp) -> Self {
        Self {
            show_settings: app.show_settings,

            resolution: app.plot_config.resolution,
            db_range: app.plot_config.db_range,
            headroom_db: app.plot_config.headroom_db,
            time_scale_secs: app.plot_config.time_scale_secs,

            compressor: app.compressor.clone(),

            gain_reduction: app.gain_reduction_style.clone(),
            curve: app.curve_style.clone(),
            threshold: app.threshold_style.clone(),
        }
    }

    /// Apply loaded settings to the running application.
    pub fn apply(&self, app: &mut LevelPlotApp) {
        app.show_settings = self.show_settings;

        app.plot_config.resolution = self.resolution;
        app.plot_config.db_range = self.db_range;
        app.plot_config.headroom_db = self.headroom_db;
        app.plot_config.time_scale_secs = self.time_scale_secs;

        app.compressor = self.compressor.clone();

        app.gain_reduction_style = self.gain_reduction.clone();
        app.curve_style = self.curve.clone();
        app.threshold_style = self.threshold.clone();

        app.layers_need_update = true;
    }
}

/// Returns the path snapshots are written to: `~/Pictures/levelplot-snapshot.png`
fn snapshot_path() -> PathBuf {
    let mut path = dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    path.push("levelplot-snapshot.png");
    path
}

/// Save a rendered frame as PNG
pub fn save_snapshot(frame: PixelFrame<'_>) -> Result<PathBuf, image::ImageError> {
    let path = snapshot_path();
    frame.to_rgba_image().save(&path)?;
    log::info!("Saved snapshot to {}", path.display());
    Ok(path)
}
