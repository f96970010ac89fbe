//! Panel configuration.
//!
//! Loaded once at startup from a TOML file (path in `PANEL_CONFIG`) or
//! built from defaults. Every section and field is optional in the file.
//!
//! ```toml
//! [display]
//! width = 800
//! height = 480
//!
//! [[routes]]
//! from_id = "9021012080040000"
//! to_id = "9021012081216000"
//! title = "Hyllie -> Lund"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::refresh::DEFAULT_STALENESS_SECS;
use crate::render::{FontSet, FontSize, FontSizes, MAX_ROWS};
use crate::skanetrafiken::{DEFAULT_MIN_MINUTES_AHEAD, JourneyClientConfig};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "PANEL_CONFIG";

/// Errors while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete panel configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub display: DisplayConfig,
    pub timezone: TimezoneConfig,
    pub api: ApiConfig,
    /// Routes shown side by side on the journey board, left to right.
    pub routes: Vec<RouteConfig>,
    pub art: ArtConfig,
    pub timing: TimingConfig,
    pub logging: LoggingConfig,
    pub preview: PreviewConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            timezone: TimezoneConfig::default(),
            api: ApiConfig::default(),
            routes: vec![
                RouteConfig::new("9021012080040000", "9021012081216000", "Hyllie -> Lund"),
                RouteConfig::new("9021012080040000", "9021012045011000", "Hyllie -> Østerport"),
            ],
            art: ArtConfig::default(),
            timing: TimingConfig::default(),
            logging: LoggingConfig::default(),
            preview: PreviewConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the file named by `PANEL_CONFIG`, or use defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Problems that do not stop the panel but show up on it, such as
    /// route titles with characters the fonts cannot draw.
    pub fn warnings(&self) -> Vec<String> {
        let fonts = FontSet::from_sizes(&self.display.font_sizes);
        self.routes
            .iter()
            .filter_map(|route| {
                let missing = fonts.missing_glyphs(FontSize::MediumLarge, &route.title);
                if missing.is_empty() {
                    return None;
                }
                let chars: String = missing.into_iter().collect();
                Some(format!(
                    "route title {:?} has characters the font cannot draw: {chars:?}",
                    route.title
                ))
            })
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "display size {}x{} is empty",
                self.display.width, self.display.height
            )));
        }
        if self.routes.is_empty() {
            return Err(ConfigError::Invalid("at least one route is required".into()));
        }
        if let Some(route) = self.routes.iter().find(|r| r.max_rows == 0) {
            return Err(ConfigError::Invalid(format!(
                "route {:?} shows no rows",
                route.title
            )));
        }
        Ok(())
    }
}

/// Panel geometry and text sizes.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub font_sizes: FontSizes,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            font_sizes: FontSizes::default(),
        }
    }
}

/// Zones for API times and for the panel.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TimezoneConfig {
    pub source: Tz,
    pub local: Tz,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            source: Tz::UTC,
            local: Tz::Europe__Stockholm,
        }
    }
}

/// Journey API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Serve canned responses from this directory instead of the API.
    pub mock_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let client = JourneyClientConfig::default();
        Self {
            base_url: client.base_url,
            timeout_secs: client.timeout_secs,
            mock_dir: None,
        }
    }
}

impl ApiConfig {
    pub fn client_config(&self) -> JourneyClientConfig {
        JourneyClientConfig::new()
            .with_base_url(&self.base_url)
            .with_timeout(self.timeout_secs)
    }
}

/// One origin → destination column on the journey board.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RouteConfig {
    pub from_id: String,
    pub to_id: String,
    pub title: String,
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

fn default_max_rows() -> usize {
    MAX_ROWS
}

impl RouteConfig {
    pub fn new(from_id: impl Into<String>, to_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            title: title.into(),
            max_rows: MAX_ROWS,
        }
    }

    /// Rows actually shown: never more than the board has room for.
    pub fn rows(&self) -> usize {
        self.max_rows.min(MAX_ROWS)
    }
}

/// Artwork location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtConfig {
    pub folder: PathBuf,
}

impl Default for ArtConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("img"),
        }
    }
}

/// Delays and thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Pause after a full journey frame before switching to partial mode.
    pub journey_settle_ms: u64,
    /// Pause after showing artwork before putting the panel to sleep.
    pub art_settle_ms: u64,
    /// Maximum age of the journey base frame.
    pub staleness_secs: i64,
    /// Departures closer than this are not listed.
    pub min_minutes_ahead: i64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            journey_settle_ms: 2000,
            art_settle_ms: 3000,
            staleness_secs: DEFAULT_STALENESS_SECS,
            min_minutes_ahead: DEFAULT_MIN_MINUTES_AHEAD,
        }
    }
}

impl TimingConfig {
    pub fn journey_settle(&self) -> StdDuration {
        StdDuration::from_millis(self.journey_settle_ms)
    }

    pub fn art_settle(&self) -> StdDuration {
        StdDuration::from_millis(self.art_settle_ms)
    }

    pub fn staleness(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.staleness_secs)
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for the daily log file; `None` logs to stdout only.
    pub dir: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: Some(PathBuf::from("logs")),
            file_prefix: "journey-panel.log".to_string(),
        }
    }
}

/// Where the preview device writes frames.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub dir: PathBuf,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("preview"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AppConfig::default();

        assert_eq!(config.display.width, 800);
        assert_eq!(config.display.height, 480);
        assert_eq!(config.display.font_sizes.large, 42);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].max_rows, 5);
        assert_eq!(config.timezone.local, Tz::Europe__Stockholm);
        assert_eq!(config.timing.staleness_secs, 300);
        assert_eq!(config.timing.min_minutes_ahead, 5);
        assert_eq!(config.art.folder, PathBuf::from("img"));
    }

    #[test]
    fn default_titles_render_without_replacement_glyphs() {
        use crate::render::{DrawCommand, Frame, render};
        use embedded_graphics::prelude::Point;

        let config = AppConfig::default();
        assert!(config.warnings().is_empty());

        let fonts = FontSet::from_sizes(&config.display.font_sizes);
        let ink = |c: char| {
            let mut frame = Frame::new(64, 64);
            let text = DrawCommand::Text {
                origin: Point::zero(),
                text: c.to_string(),
                font: FontSize::MediumLarge,
            };
            render(&mut frame, &[text], &fonts).unwrap();
            frame
        };

        let replacement = ink('?');
        for route in &config.routes {
            for c in route.title.chars().filter(|c| !c.is_whitespace()) {
                assert_ne!(ink(c), replacement, "{c:?} in {:?}", route.title);
            }
        }
    }

    #[test]
    fn warns_about_undrawable_titles() {
        let mut config = AppConfig::default();
        config.routes[1].title = "Hyllie → Østerport".into();

        let warnings = config.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains('→'));
        assert!(warnings[0].contains("Østerport"));
    }

    #[test]
    fn duration_methods() {
        let timing = TimingConfig::default();

        assert_eq!(timing.journey_settle(), StdDuration::from_secs(2));
        assert_eq!(timing.art_settle(), StdDuration::from_secs(3));
        assert_eq!(timing.staleness(), chrono::Duration::seconds(300));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_file_overrides() {
        let config = AppConfig::from_toml(
            r#"
            [display]
            width = 640

            [timezone]
            local = "Europe/Copenhagen"

            [[routes]]
            from_id = "1"
            to_id = "2"
            title = "Home"
            max_rows = 9
            "#,
        )
        .unwrap();

        assert_eq!(config.display.width, 640);
        assert_eq!(config.display.height, 480);
        assert_eq!(config.timezone.local, Tz::Europe__Copenhagen);
        assert_eq!(config.timezone.source, Tz::UTC);
        assert_eq!(config.routes, vec![RouteConfig { max_rows: 9, ..RouteConfig::new("1", "2", "Home") }]);
        assert_eq!(config.routes[0].rows(), 5);
    }

    #[test]
    fn rejects_invalid() {
        assert!(matches!(
            AppConfig::from_toml("routes = []"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_toml("[display]\nwidth = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_toml("[timezone]\nlocal = \"Mars/Olympus\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn client_config_from_api_section() {
        let api = ApiConfig {
            base_url: "http://localhost:9000".into(),
            timeout_secs: 5,
            mock_dir: None,
        };
        let client = api.client_config();
        assert_eq!(client.base_url, "http://localhost:9000");
        assert_eq!(client.timeout_secs, 5);
    }
}
