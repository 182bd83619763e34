use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{ViewError, ViewResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Overrides the monitor scale factor reported to the engine.
    #[serde(default)]
    pub pixel_ratio: Option<f64>,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// env_logger filter syntax. `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,

    #[serde(default = "default_true")]
    pub timestamps: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
}

impl RenderConfig {
    #[inline]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }
}

fn default_title() -> String {
    "embedview".to_string()
}
fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}
fn default_log_filter() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_frame_interval_ms() -> u64 {
    16
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            timestamps: default_true(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            pixel_ratio: None,
            log: LogConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(s: &str) -> ViewResult<Self> {
        Self::parse(s).map_err(ViewError::Config)
    }

    /// Missing file means defaults; a file that exists but does not parse is an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> ViewResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(s) => Self::parse(&s)
                .map_err(|msg| ViewError::Config(format!("{}: {}", path.display(), msg))),
            Err(_) => Ok(Self::default()),
        }
    }

    fn parse(s: &str) -> Result<Self, String> {
        let cfg: ViewerConfig = toml::from_str(s).map_err(|e| e.to_string())?;
        if cfg.width == 0 || cfg.height == 0 {
            return Err(format!(
                "window size must be non-zero, got {}x{}",
                cfg.width, cfg.height
            ));
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = ViewerConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.width, 1280);
        assert_eq!(cfg.height, 720);
        assert_eq!(cfg.log.filter, "info");
        assert_eq!(cfg.render.frame_interval(), Duration::from_millis(16));
        assert!(cfg.pixel_ratio.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let cfg = ViewerConfig::from_toml_str(
            r#"
            title = "demo"
            width = 640
            height = 480
            pixel_ratio = 2.0

            [log]
            filter = "embedview_core=trace"

            [render]
            frame_interval_ms = 0
            "#,
        )
        .unwrap();

        assert_eq!(cfg.title, "demo");
        assert_eq!((cfg.width, cfg.height), (640, 480));
        assert_eq!(cfg.pixel_ratio, Some(2.0));
        assert_eq!(cfg.log.filter, "embedview_core=trace");
        assert!(cfg.log.timestamps);
        assert_eq!(cfg.render.frame_interval(), Duration::from_millis(1));
    }

    #[test]
    fn zero_window_size_is_rejected() {
        let err = ViewerConfig::from_toml_str("width = 0").unwrap_err();
        assert!(matches!(err, ViewError::Config(_)));
    }

    #[test]
    fn bad_file_error_names_the_path_once() {
        let path = std::env::temp_dir().join(format!("embedview-bad-{}.toml", std::process::id()));
        fs::write(&path, "width = 0").unwrap();

        let err = ViewerConfig::load_or_default(&path).unwrap_err();
        let _ = fs::remove_file(&path);

        let msg = err.to_string();
        assert_eq!(msg.matches("config error").count(), 1, "{msg}");
        assert!(msg.contains(&path.display().to_string()), "{msg}");
        assert!(msg.contains("window size must be non-zero"), "{msg}");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let cfg = ViewerConfig::load_or_default("/definitely/not/here/viewer.toml").unwrap();
        assert_eq!(cfg.title, "embedview");
    }
}
