//! Device output channels — one sysfs brightness file per glyph segment.

use std::fmt;
use std::path::{Path, PathBuf};

// ── Error type ──

/// Channel I/O errors.
///
/// String payloads follow the convention **"context: details"** where *context*
/// identifies the operation (e.g. the file path) and *details* describes what
/// went wrong.
#[derive(Debug)]
pub enum ChannelError {
    WriteFailed { channel: Channel, reason: String },
    ReadFailed { channel: Channel, reason: String },
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::WriteFailed { channel, reason } => {
                write!(f, "Failed to write channel {channel}: {reason}")
            }
            ChannelError::ReadFailed { channel, reason } => {
                write!(f, "Failed to read channel {channel}: {reason}")
            }
        }
    }
}

impl std::error::Error for ChannelError {}

pub type Result<T> = std::result::Result<T, ChannelError>;

// ── Channel enum ──

/// One physical LED segment of the glyph array.
///
/// The discriminant order matches the field order of script records: a record
/// `a;b;c;d;e` maps field 0 to `CameraRing` through field 4 to `Slant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    CameraRing,
    CenterRing,
    Bar,
    Dot,
    Slant,
}

impl Channel {
    /// All five channels, in script field order.
    pub const ALL: [Channel; 5] = [
        Channel::CameraRing,
        Channel::CenterRing,
        Channel::Bar,
        Channel::Dot,
        Channel::Slant,
    ];

    /// Number of channels (and the minimum field count of a script record).
    pub const COUNT: usize = 5;

    /// Stable index into frame arrays (0..5, script field order).
    pub fn index(self) -> usize {
        match self {
            Channel::CameraRing => 0,
            Channel::CenterRing => 1,
            Channel::Bar => 2,
            Channel::Dot => 3,
            Channel::Slant => 4,
        }
    }

    /// Logical name, used in config overrides and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            Channel::CameraRing => "camera_ring",
            Channel::CenterRing => "center_ring",
            Channel::Bar => "bar",
            Channel::Dot => "dot",
            Channel::Slant => "slant",
        }
    }

    /// Look up a channel by its logical name.
    pub fn from_name(name: &str) -> Option<Channel> {
        Channel::ALL.into_iter().find(|ch| ch.name() == name)
    }

    /// Default sysfs brightness file for this segment.
    pub fn default_path(self) -> &'static str {
        match self {
            Channel::CameraRing => "/sys/class/leds/aw210xx_led/rear_cam_led_br",
            Channel::CenterRing => "/sys/class/leds/aw210xx_led/round_leds_br",
            Channel::Bar => "/sys/class/leds/aw210xx_led/vline_leds_br",
            Channel::Dot => "/sys/class/leds/aw210xx_led/dot_led_br",
            Channel::Slant => "/sys/class/leds/aw210xx_led/horse_race_leds_br",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Trait ──

/// Write target for the five glyph segments.
///
/// The playback engine only ever talks to this trait; the sysfs backend and
/// the in-memory mock both implement it.
pub trait ChannelBank {
    /// Write a raw brightness value to one channel.
    fn write(&self, channel: Channel, value: u32) -> Result<()>;

    /// Read back the current raw brightness value of one channel.
    fn read(&self, channel: Channel) -> Result<u32>;

    /// Write zero to every channel, continuing past individual failures.
    ///
    /// Returns the first error encountered, if any, after attempting all five.
    fn clear_all(&self) -> Result<()> {
        let mut first_err = None;
        for ch in Channel::ALL {
            if let Err(e) = self.write(ch, 0)
                && first_err.is_none()
            {
                first_err = Some(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// ── Sysfs backend ──

/// Channel bank backed by sysfs brightness files.
#[derive(Debug, Clone)]
pub struct SysfsChannelBank {
    paths: [PathBuf; 5],
}

impl Default for SysfsChannelBank {
    fn default() -> Self {
        Self::new()
    }
}

impl SysfsChannelBank {
    /// Bank with the default sysfs paths.
    pub fn new() -> Self {
        SysfsChannelBank {
            paths: Channel::ALL.map(|ch| PathBuf::from(ch.default_path())),
        }
    }

    /// Replace the path for one channel (config override).
    pub fn set_path(&mut self, channel: Channel, path: impl Into<PathBuf>) {
        self.paths[channel.index()] = path.into();
    }

    /// Resolved path for one channel.
    pub fn path(&self, channel: Channel) -> &Path {
        &self.paths[channel.index()]
    }
}

impl ChannelBank for SysfsChannelBank {
    fn write(&self, channel: Channel, value: u32) -> Result<()> {
        let path = self.path(channel);
        std::fs::write(path, format!("{value}\n")).map_err(|e| ChannelError::WriteFailed {
            channel,
            reason: format!("{}: {e}", path.display()),
        })
    }

    fn read(&self, channel: Channel) -> Result<u32> {
        let path = self.path(channel);
        let contents =
            std::fs::read_to_string(path).map_err(|e| ChannelError::ReadFailed {
                channel,
                reason: format!("{}: {e}", path.display()),
            })?;
        contents
            .trim()
            .parse::<u32>()
            .map_err(|e| ChannelError::ReadFailed {
                channel,
                reason: format!("{}: not a number: {e}", path.display()),
            })
    }
}

// ── Mock for tests ──

pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// In-memory channel bank for unit tests. Records every write in order;
    /// `fail_on` injects a write failure for one channel. Thread-safe so the
    /// player's worker can write while the test thread inspects.
    pub struct MockBank {
        /// Recorded writes, in order: (channel, value).
        pub writes: Mutex<Vec<(Channel, u32)>>,
        /// If set, writes to this channel fail.
        pub fail_channel: Mutex<Option<Channel>>,
    }

    impl Default for MockBank {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockBank {
        pub fn new() -> Self {
            MockBank {
                writes: Mutex::new(Vec::new()),
                fail_channel: Mutex::new(None),
            }
        }

        /// Make every write to `channel` fail.
        pub fn fail_on(&self, channel: Channel) {
            *self.fail_channel.lock().unwrap() = Some(channel);
        }

        /// Snapshot of all recorded writes.
        pub fn writes(&self) -> Vec<(Channel, u32)> {
            self.writes.lock().unwrap().clone()
        }

        /// Last value written to one channel.
        pub fn last_value(&self, channel: Channel) -> Option<u32> {
            self.writes
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|(ch, _)| *ch == channel)
                .map(|(_, v)| *v)
        }

        /// Whether every channel's most recent write was zero.
        pub fn all_zero(&self) -> bool {
            Channel::ALL
                .into_iter()
                .all(|ch| self.last_value(ch) == Some(0))
        }
    }

    impl ChannelBank for MockBank {
        fn write(&self, channel: Channel, value: u32) -> Result<()> {
            if *self.fail_channel.lock().unwrap() == Some(channel) {
                return Err(ChannelError::WriteFailed {
                    channel,
                    reason: "mock: injected failure".into(),
                });
            }
            self.writes.lock().unwrap().push((channel, value));
            Ok(())
        }

        fn read(&self, channel: Channel) -> Result<u32> {
            Ok(self.last_value(channel).unwrap_or(0))
        }
    }
}
