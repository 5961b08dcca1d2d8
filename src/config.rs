//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every field has a default, so an empty file (or a missing section) yields
//! the stock Daydream setup.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::controller::calibration::MAX_DEADZONE;
use crate::controller::device::Hand;
use crate::controller::visual::{ButtonPalette, Color};
use crate::error::{ControlsError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub controls: ControlsConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub event_log: EventLogConfig,
}

/// Daydream component configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ControlsConfig {
    /// Hand the controller is held in. Also informs the arm model.
    #[serde(default)]
    pub hand: Hand,

    #[serde(default = "default_button_color")]
    pub button_color: Color,

    #[serde(default = "default_button_touched_color")]
    pub button_touched_color: Color,

    #[serde(default = "default_button_highlight_color")]
    pub button_highlight_color: Color,

    /// Load the controller model and highlight buttons on it.
    #[serde(default = "default_model")]
    pub model: bool,

    /// Rotation offset in degrees.
    #[serde(default)]
    pub rotation_offset: f32,

    /// Apply the procedural arm model.
    #[serde(default = "default_arm_model")]
    pub arm_model: bool,
}

/// Host input configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InputConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub axis_deadzone: f32,

    /// Single device to read. Empty enumerates all input devices.
    #[serde(default)]
    pub device_path: String,
}

/// Event log configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct EventLogConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_max_records_per_file")]
    pub max_records_per_file: usize,

    #[serde(default = "default_max_files_to_keep")]
    pub max_files_to_keep: usize,
}

// Default value functions
fn default_button_color() -> Color { Color::new(0x00, 0x00, 0x00) }
fn default_button_touched_color() -> Color { Color::new(0x77, 0x77, 0x77) }
fn default_button_highlight_color() -> Color { Color::new(0xff, 0xff, 0xff) }
fn default_model() -> bool { true }
fn default_arm_model() -> bool { true }

fn default_poll_interval_ms() -> u64 { 16 }

fn default_log_dir() -> String { "./logs".to_string() }
fn default_max_records_per_file() -> usize { 10000 }
fn default_max_files_to_keep() -> usize { 10 }

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            hand: Hand::Unspecified,
            button_color: default_button_color(),
            button_touched_color: default_button_touched_color(),
            button_highlight_color: default_button_highlight_color(),
            model: default_model(),
            rotation_offset: 0.0,
            arm_model: default_arm_model(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            axis_deadzone: 0.0,
            device_path: String::new(),
        }
    }
}

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_dir: default_log_dir(),
            max_records_per_file: default_max_records_per_file(),
            max_files_to_keep: default_max_files_to_keep(),
        }
    }
}

impl ControlsConfig {
    /// The idle/touched/highlight colors as a palette.
    #[must_use]
    pub fn palette(&self) -> ButtonPalette {
        ButtonPalette {
            idle: self.button_color,
            touched: self.button_touched_color,
            highlight: self.button_highlight_color,
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> ControlsError {
    ControlsError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails (including malformed colors or hands)
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use daydream_controls::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Examples
    ///
    /// ```
    /// use daydream_controls::config::Config;
    /// use daydream_controls::controller::device::Hand;
    ///
    /// let config = Config::from_toml("[controls]\nhand = \"left\"\n")?;
    /// assert_eq!(config.controls.hand, Hand::Left);
    /// assert!(config.controls.model);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if !self.controls.rotation_offset.is_finite() {
            return Err(invalid("rotation_offset must be a finite number"));
        }

        if self.input.poll_interval_ms == 0 || self.input.poll_interval_ms > 1000 {
            return Err(invalid("poll_interval_ms must be between 1 and 1000"));
        }

        if !(0.0..=MAX_DEADZONE).contains(&self.input.axis_deadzone) {
            return Err(invalid(format!(
                "axis_deadzone must be between 0.0 and {}",
                MAX_DEADZONE
            )));
        }

        if self.event_log.enabled && self.event_log.log_dir.is_empty() {
            return Err(invalid("event_log log_dir cannot be empty when enabled"));
        }

        if self.event_log.max_records_per_file == 0 {
            return Err(invalid("max_records_per_file must be greater than 0"));
        }

        if self.event_log.max_files_to_keep == 0 {
            return Err(invalid("max_files_to_keep must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_controls_match_component_defaults() {
        let controls = ControlsConfig::default();
        assert_eq!(controls.hand, Hand::Unspecified);
        assert_eq!(controls.button_color.to_string(), "#000000");
        assert_eq!(controls.button_touched_color.to_string(), "#777777");
        assert_eq!(controls.button_highlight_color.to_string(), "#ffffff");
        assert!(controls.model);
        assert_eq!(controls.rotation_offset, 0.0);
        assert!(controls.arm_model);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.controls, ControlsConfig::default());
        assert_eq!(config.input, InputConfig::default());
        assert_eq!(config.event_log, EventLogConfig::default());
    }

    #[test]
    fn test_parse_full_controls_section() {
        let toml_content = r##"
[controls]
hand = "right"
button_color = "#112233"
button_touched_color = "#abc"
button_highlight_color = "#FF0000"
model = false
rotation_offset = -15.5
arm_model = false
"##;
        let config = Config::from_toml(toml_content).unwrap();
        let controls = &config.controls;
        assert_eq!(controls.hand, Hand::Right);
        assert_eq!(controls.button_color, Color::new(0x11, 0x22, 0x33));
        assert_eq!(controls.button_touched_color, Color::new(0xaa, 0xbb, 0xcc));
        assert_eq!(controls.button_highlight_color, Color::new(0xff, 0x00, 0x00));
        assert!(!controls.model);
        assert_eq!(controls.rotation_offset, -15.5);
        assert!(!controls.arm_model);
    }

    #[test]
    fn test_empty_hand_is_unspecified() {
        let config = Config::from_toml("[controls]\nhand = \"\"\n").unwrap();
        assert_eq!(config.controls.hand, Hand::Unspecified);
    }

    #[test]
    fn test_invalid_hand_rejected() {
        let result = Config::from_toml("[controls]\nhand = \"middle\"\n");
        assert!(matches!(result, Err(ControlsError::Config(_))));
    }

    #[test]
    fn test_malformed_color_rejected() {
        let result = Config::from_toml("[controls]\nbutton_color = \"black\"\n");
        assert!(matches!(result, Err(ControlsError::Config(_))));
    }

    #[test]
    fn test_palette_from_controls() {
        let controls = ControlsConfig {
            button_color: Color::new(1, 2, 3),
            ..ControlsConfig::default()
        };
        let palette = controls.palette();
        assert_eq!(palette.idle, Color::new(1, 2, 3));
        assert_eq!(palette.touched, controls.button_touched_color);
        assert_eq!(palette.highlight, controls.button_highlight_color);
    }

    #[test]
    fn test_load_config_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let toml_content = r#"
[controls]
hand = "left"

[input]
poll_interval_ms = 8

[event_log]
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = Config::load(temp_file.path()).unwrap();
        assert_eq!(config.controls.hand, Hand::Left);
        assert_eq!(config.input.poll_interval_ms, 8);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/daydream.toml");
        assert!(matches!(result, Err(ControlsError::Io(_))));
    }

    #[test]
    fn test_rotation_offset_not_finite() {
        let mut config = Config::default();
        config.controls.rotation_offset = f32::INFINITY;
        assert!(config.validate().is_err());

        config.controls.rotation_offset = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_zero() {
        let mut config = Config::default();
        config.input.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_too_high() {
        let mut config = Config::default();
        config.input.poll_interval_ms = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_axis_deadzone_negative() {
        let mut config = Config::default();
        config.input.axis_deadzone = -0.01;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_axis_deadzone_too_high() {
        let mut config = Config::default();
        config.input.axis_deadzone = 0.3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_axis_deadzone_bounds_valid() {
        for deadzone in [0.0, 0.1, 0.25] {
            let mut config = Config::default();
            config.input.axis_deadzone = deadzone;
            assert!(config.validate().is_ok(), "Deadzone {} should be valid", deadzone);
        }
    }

    #[test]
    fn test_empty_log_dir_when_enabled() {
        let mut config = Config::default();
        config.event_log.enabled = true;
        config.event_log.log_dir = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_log_dir_when_disabled() {
        let mut config = Config::default();
        config.event_log.enabled = false;
        config.event_log.log_dir = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_max_records_per_file_zero() {
        let mut config = Config::default();
        config.event_log.max_records_per_file = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_files_to_keep_zero() {
        let mut config = Config::default();
        config.event_log.max_files_to_keep = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_button_color(), Color::BLACK);
        assert_eq!(default_button_touched_color(), Color::new(0x77, 0x77, 0x77));
        assert_eq!(default_button_highlight_color(), Color::WHITE);
        assert_eq!(default_model(), true);
        assert_eq!(default_arm_model(), true);
        assert_eq!(default_poll_interval_ms(), 16);
        assert_eq!(default_log_dir(), "./logs");
        assert_eq!(default_max_records_per_file(), 10000);
        assert_eq!(default_max_files_to_keep(), 10);
    }
}
