//! Animation scripts — frame parsing and name-based resolution.
//!
//! A script is a finite sequence of frames; each frame holds one brightness
//! percentage per channel. Scripts are resolved by name through a
//! [`ScriptSource`] and stored on disk as `anim_<name>.csv`: one frame per
//! line, fields separated by `;`, at least five numeric fields per line.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::channel::Channel;

/// Field separator within one script record.
pub const FIELD_SEPARATOR: char = ';';

// ── Error type ──

#[derive(Debug)]
pub enum ScriptError {
    /// No script exists under the given name.
    NotFound(String),
    /// The name contains characters outside `[A-Za-z0-9_-]`.
    InvalidName(String),
    /// A record could not be parsed (short record, non-numeric field).
    Malformed { line: usize, reason: String },
    /// Underlying I/O failure other than "not found".
    Io(String),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::NotFound(name) => write!(f, "Animation not found: {name}"),
            ScriptError::InvalidName(name) => write!(f, "Invalid animation name: {name}"),
            ScriptError::Malformed { line, reason } => {
                write!(f, "Malformed script record at line {line}: {reason}")
            }
            ScriptError::Io(e) => write!(f, "Script I/O error: {e}"),
        }
    }
}

impl std::error::Error for ScriptError {}

pub type Result<T> = std::result::Result<T, ScriptError>;

// ── Frame / Script ──

/// One time-step's target brightness percentages, one per channel, in script
/// field order. Values are nominally 0.0–100.0 but are not validated — the
/// source is a trusted bundled resource, and out-of-range values pass through
/// the scaling formula as-is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame(pub [f32; Channel::COUNT]);

impl Frame {
    /// Percentage for one channel.
    pub fn get(&self, channel: Channel) -> f32 {
        self.0[channel.index()]
    }
}

/// An ordered sequence of frames, length ≥ 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub frames: Vec<Frame>,
}

impl Script {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Parse script text. One frame per non-blank line; each line needs at
    /// least [`Channel::COUNT`] `;`-separated numeric fields, extras ignored.
    pub fn parse(text: &str) -> Result<Script> {
        let mut frames = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let record = raw.trim();
            if record.is_empty() {
                continue;
            }
            let fields: Vec<&str> = record.split(FIELD_SEPARATOR).collect();
            if fields.len() < Channel::COUNT {
                return Err(ScriptError::Malformed {
                    line,
                    reason: format!(
                        "expected at least {} fields, got {}",
                        Channel::COUNT,
                        fields.len()
                    ),
                });
            }
            let mut values = [0.0f32; Channel::COUNT];
            for (i, field) in fields.iter().take(Channel::COUNT).enumerate() {
                values[i] = field.trim().parse::<f32>().map_err(|_| {
                    ScriptError::Malformed {
                        line,
                        reason: format!("field {}: not a number: {:?}", i + 1, field.trim()),
                    }
                })?;
            }
            frames.push(Frame(values));
        }
        Ok(Script { frames })
    }
}

// ── Source trait ──

/// Resolves a symbolic animation name to its frame sequence.
pub trait ScriptSource {
    fn load(&self, name: &str) -> Result<Script>;
}

/// Script source backed by a directory of `anim_<name>.csv` files.
#[derive(Debug, Clone)]
pub struct DirScriptSource {
    dir: PathBuf,
}

impl DirScriptSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirScriptSource { dir: dir.into() }
    }

    /// The file a name resolves to, without checking existence.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("anim_{name}.csv"))
    }
}

/// Names are restricted to `[A-Za-z0-9_-]` so a name can never escape the
/// animations directory.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ScriptError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl ScriptSource for DirScriptSource {
    fn load(&self, name: &str) -> Result<Script> {
        validate_name(name)?;
        let path = self.path_for(name);
        let text = read_script_file(&path, name)?;
        Script::parse(&text)
    }
}

fn read_script_file(path: &Path, name: &str) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ScriptError::NotFound(name.to_string()))
        }
        Err(e) => Err(ScriptError::Io(format!("{}: {e}", path.display()))),
    }
}

// ── Mock for tests ──

pub mod mock {
    use super::*;
    use std::collections::HashMap;

    /// In-memory script source for unit tests. Unknown names return
    /// [`ScriptError::NotFound`].
    #[derive(Debug, Default, Clone)]
    pub struct StaticSource {
        scripts: HashMap<String, Script>,
    }

    impl StaticSource {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a script under a name, from raw frame percentages.
        pub fn insert(&mut self, name: &str, frames: Vec<[f32; Channel::COUNT]>) {
            self.scripts.insert(
                name.to_string(),
                Script {
                    frames: frames.into_iter().map(Frame).collect(),
                },
            );
        }
    }

    impl ScriptSource for StaticSource {
        fn load(&self, name: &str) -> Result<Script> {
            self.scripts
                .get(name)
                .cloned()
                .ok_or_else(|| ScriptError::NotFound(name.to_string()))
        }
    }
}
