//! TOML-based configuration.
//!
//! Holds the plain numeric/enum knobs a session is constructed with:
//! - Mode and team count
//! - Countdown duration, tick interval and strobe period
//! - Per-unit reveal durations
//! - Surface size and contact radius
//! - Feedback switches
//!
//! The default location is `<config dir>/fingerdraw/config.toml`. Nothing in
//! the core reads it implicitly; callers load a `Config` and hand it to
//! [`SelectionStateMachine::new`](crate::SelectionStateMachine::new).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::countdown::{DEFAULT_STROBE_PERIOD, DEFAULT_TICK_INTERVAL_MS};
use crate::error::ConfigError;
use crate::mode::{clamp_team_count, Mode, ModeKind};
use crate::reveal::Surface;

/// Session-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub mode: ModeKind,
    #[serde(default = "default_team_count")]
    pub team_count: u8,
    #[serde(default = "default_countdown_ms")]
    pub countdown_ms: u64,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Strobe length as a fraction of the countdown.
    #[serde(default = "default_strobe_period")]
    pub strobe_period: f32,
}

/// Duration of one reveal unit, per mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealConfig {
    #[serde(default = "default_cover_ms")]
    pub cover_ms: u64,
    #[serde(default = "default_rank_ms")]
    pub rank_ms: u64,
    #[serde(default = "default_team_ms")]
    pub team_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    #[serde(default = "default_contact_radius")]
    pub contact_radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Play a note as each reveal unit starts.
    #[serde(default = "default_true")]
    pub reveal_notes: bool,
}

/// Full configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

// Default functions
fn default_team_count() -> u8 {
    2
}
fn default_countdown_ms() -> u64 {
    3000
}
fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}
fn default_strobe_period() -> f32 {
    DEFAULT_STROBE_PERIOD
}
fn default_cover_ms() -> u64 {
    600
}
fn default_rank_ms() -> u64 {
    500
}
fn default_team_ms() -> u64 {
    800
}
fn default_width() -> f32 {
    1080.0
}
fn default_height() -> f32 {
    1920.0
}
fn default_contact_radius() -> f32 {
    150.0
}
fn default_true() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: ModeKind::default(),
            team_count: default_team_count(),
            countdown_ms: default_countdown_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            strobe_period: default_strobe_period(),
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            cover_ms: default_cover_ms(),
            rank_ms: default_rank_ms(),
            team_ms: default_team_ms(),
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            contact_radius: default_contact_radius(),
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reveal_notes: true,
        }
    }
}

impl RevealConfig {
    pub fn unit_duration_ms(&self, mode: Mode) -> u64 {
        match mode {
            Mode::SinglePick => self.cover_ms,
            Mode::Ordering => self.rank_ms,
            Mode::Teams { .. } => self.team_ms,
        }
    }
}

impl SurfaceConfig {
    pub fn surface(&self) -> Surface {
        Surface {
            width: self.width,
            height: self.height,
        }
    }
}

impl Config {
    /// Config with the given mode and every other value at its default.
    pub fn for_mode(mode: Mode) -> Self {
        let mut cfg = Self::default();
        cfg.set_mode(mode);
        cfg
    }

    pub fn mode(&self) -> Mode {
        self.session.mode.with_teams(self.session.team_count)
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.session.mode = mode.kind();
        if let Mode::Teams { teams } = mode {
            self.session.team_count = clamp_team_count(teams);
        }
    }

    /// Clamp out-of-range values instead of rejecting them.
    pub fn validated(mut self) -> Self {
        let clamped = clamp_team_count(self.session.team_count);
        if clamped != self.session.team_count {
            warn!(
                requested = self.session.team_count,
                clamped, "team count out of range, clamping"
            );
            self.session.team_count = clamped;
        }
        let period = self.session.strobe_period;
        if !(period.is_finite() && period > 0.0 && period <= 1.0) {
            warn!(period, "strobe period out of range, using default");
            self.session.strobe_period = DEFAULT_STROBE_PERIOD;
        }
        if !(self.surface.contact_radius.is_finite() && self.surface.contact_radius >= 0.0) {
            warn!(radius = self.surface.contact_radius, "invalid contact radius, using default");
            self.surface.contact_radius = default_contact_radius();
        }
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content)?;
        Ok(cfg.validated())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// `<config dir>/fingerdraw/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform has no configuration directory.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("fingerdraw").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Persist to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = self.to_toml_string()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Load from the default location, returning defaults if the file is
    /// missing or broken. This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        let Ok(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(&path).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring unreadable config");
            Self::default()
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key. The new value is parsed
    /// according to the type of the existing one and the result is
    /// re-validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for unknown keys and values of
    /// the wrong type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        set_json_value_by_path(&mut json, key, value).map_err(invalid)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        *self = updated.validated();
        Ok(())
    }
}

fn set_json_value_by_path(
    root: &mut serde_json::Value,
    key: &str,
    value: &str,
) -> Result<(), String> {
    let mut parts = key.split('.').peekable();
    if key.is_empty() {
        return Err("config key is empty".into());
    }

    let mut current = root;
    while let Some(part) = parts.next() {
        if parts.peek().is_some() {
            current = current
                .get_mut(part)
                .ok_or_else(|| format!("unknown config key: {key}"))?;
            continue;
        }
        let obj = current
            .as_object_mut()
            .ok_or_else(|| format!("unknown config key: {key}"))?;
        let existing = obj
            .get(part)
            .ok_or_else(|| format!("unknown config key: {key}"))?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| format!("cannot parse '{value}' as bool"))?,
            ),
            serde_json::Value::Number(_) => {
                if let Ok(n) = value.parse::<u64>() {
                    serde_json::Value::Number(n.into())
                } else {
                    value
                        .parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| format!("cannot parse '{value}' as number"))?
                }
            }
            _ => serde_json::Value::String(value.into()),
        };
        obj.insert(part.to_string(), new_value);
        return Ok(());
    }

    Err(format!("unknown config key: {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = Config::default();
        assert_eq!(cfg.mode(), Mode::SinglePick);
        assert_eq!(cfg.session.countdown_ms, 3000);
        assert_eq!(cfg.session.tick_interval_ms, 50);
        assert_eq!(cfg.reveal.cover_ms, 600);
        assert_eq!(cfg.reveal.rank_ms, 500);
        assert_eq!(cfg.reveal.team_ms, 800);
        assert_eq!(cfg.surface.contact_radius, 150.0);
        assert!(cfg.feedback.enabled);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            [session]
            mode = "teams"
            team_count = 3
            "#,
        )
        .unwrap();
        assert_eq!(cfg.mode(), Mode::teams(3));
        assert_eq!(cfg.session.countdown_ms, 3000);
        assert_eq!(cfg.reveal.team_ms, 800);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = Config::from_toml_str(
            r#"
            [session]
            mode = "teams"
            team_count = 9
            strobe_period = 0.0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.session.team_count, 4);
        assert_eq!(cfg.session.strobe_period, DEFAULT_STROBE_PERIOD);
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let err = Config::from_toml_str("[session]\nmode = \"bracket\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed(_)));
    }

    #[test]
    fn unit_duration_follows_mode() {
        let cfg = Config::default();
        assert_eq!(cfg.reveal.unit_duration_ms(Mode::SinglePick), 600);
        assert_eq!(cfg.reveal.unit_duration_ms(Mode::Ordering), 500);
        assert_eq!(cfg.reveal.unit_duration_ms(Mode::teams(2)), 800);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::for_mode(Mode::Ordering);
        assert_eq!(cfg.get("session.mode").as_deref(), Some("ordering"));
        assert_eq!(cfg.get("session.countdown_ms").as_deref(), Some("3000"));
        assert_eq!(cfg.get("feedback.enabled").as_deref(), Some("true"));
        assert!(cfg.get("session.missing").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("session.countdown_ms", "1500").unwrap();
        cfg.set("feedback.reveal_notes", "false").unwrap();
        cfg.set("session.mode", "ordering").unwrap();
        cfg.set("surface.contact_radius", "90.5").unwrap();
        assert_eq!(cfg.session.countdown_ms, 1500);
        assert!(!cfg.feedback.reveal_notes);
        assert_eq!(cfg.mode(), Mode::Ordering);
        assert_eq!(cfg.surface.contact_radius, 90.5);
    }

    #[test]
    fn set_clamps_team_count() {
        let mut cfg = Config::default();
        cfg.set("session.team_count", "12").unwrap();
        assert_eq!(cfg.session.team_count, 4);
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("session.nope", "1"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("feedback.enabled", "loud"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("session.mode", "bracket"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn toml_roundtrip_preserves_fields() {
        let cfg = Config::for_mode(Mode::teams(4));
        let parsed = Config::from_toml_str(&cfg.to_toml_string().unwrap()).unwrap();
        assert_eq!(parsed, cfg);
    }
}
