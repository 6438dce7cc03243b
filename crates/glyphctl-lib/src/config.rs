//! Application configuration — TOML-based, platform-aware paths.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::channel::{Channel, SysfsChannelBank};

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str =
    "# glyphctl configuration — changes made outside the tool may be overwritten.\n\n";

/// Device brightness ceiling.
pub const MAX_BRIGHTNESS: u32 = 4095;

/// Raw brightness values for levels 1 through 4.
pub const BRIGHTNESS_PRESETS: [u32; 4] = [102, 682, 1365, MAX_BRIGHTNESS];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Master glyph toggle. When false, the effective brightness is 0.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Brightness level, 1 (dim) to 4 (max). Default: 3.
    #[serde(default = "default_brightness")]
    pub brightness: u8,

    /// Directory holding `anim_<name>.csv` script files.
    #[serde(default = "default_animations_dir")]
    pub animations_dir: String,

    /// Per-channel sysfs path overrides, keyed by channel name.
    /// Example in TOML: `[channel_paths]` / `dot = "/sys/class/leds/test/dot_br"`
    #[serde(default)]
    pub channel_paths: HashMap<String, String>,
}

fn default_true() -> bool {
    true
}
fn default_brightness() -> u8 {
    3
}
fn default_animations_dir() -> String {
    "/vendor/etc/glyph".into()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            enabled: true,
            brightness: default_brightness(),
            animations_dir: default_animations_dir(),
            channel_paths: HashMap::new(),
        }
    }
}

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The `brightness` level is outside 1..=4.
    InvalidBrightness(u8),
    /// The `animations_dir` field is empty.
    EmptyAnimationsDir,
    /// A `channel_paths` key does not name a known channel.
    UnknownChannel(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidBrightness(level) => {
                write!(f, "Invalid brightness level {level} (expected 1-4)")
            }
            ValidationError::EmptyAnimationsDir => write!(f, "animations_dir cannot be empty"),
            ValidationError::UnknownChannel(name) => {
                write!(f, "Unknown channel in channel_paths: {name}")
            }
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("glyphctl"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        config
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Save config to the default platform path.
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config directory",
            ));
        };
        self.save_to(&path)
    }

    /// Save config to an arbitrary path atomically (write to temp file, then rename).
    ///
    /// A header comment is prepended to warn that manual edits may be overwritten.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{CONFIG_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    /// Effective raw brightness scale for playback.
    ///
    /// Levels 1-3 map to the dim presets, anything else to [`MAX_BRIGHTNESS`]
    /// (matching the device defaults). Disabled → 0, so every frame scales to
    /// a zero write.
    pub fn brightness_value(&self) -> u32 {
        if !self.enabled {
            return 0;
        }
        match self.brightness {
            1 => BRIGHTNESS_PRESETS[0],
            2 => BRIGHTNESS_PRESETS[1],
            3 => BRIGHTNESS_PRESETS[2],
            _ => MAX_BRIGHTNESS,
        }
    }

    /// Build the sysfs channel bank with any configured path overrides.
    ///
    /// Unknown override keys are skipped (validation reports them separately).
    pub fn channel_bank(&self) -> SysfsChannelBank {
        let mut bank = SysfsChannelBank::new();
        for (name, path) in &self.channel_paths {
            if let Some(ch) = Channel::from_name(name) {
                bank.set_path(ch, path);
            }
        }
        bank
    }

    /// Validate the entire config, collecting all errors.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if !(1..=4).contains(&self.brightness) {
            errors.push(ValidationError::InvalidBrightness(self.brightness));
        }
        if self.animations_dir.trim().is_empty() {
            errors.push(ValidationError::EmptyAnimationsDir);
        }
        for name in self.channel_paths.keys() {
            if Channel::from_name(name).is_none() {
                errors.push(ValidationError::UnknownChannel(name.clone()));
            }
        }
        errors
    }
}
