//! Unified error type for the glyphctl-lib crate.
//!
//! [`GlyphError`] wraps module-specific errors (`ChannelError`, `ScriptError`)
//! and domain-specific error kinds (`Config`). `From` impls allow `?` to
//! propagate across module boundaries seamlessly.

use std::fmt;

use crate::channel::ChannelError;
use crate::script::ScriptError;

/// Unified error type for glyphctl-lib operations.
#[derive(Debug)]
pub enum GlyphError {
    /// Channel I/O error (sysfs write/read).
    Channel(ChannelError),
    /// Script resolution or parse error.
    Script(ScriptError),
    /// Standard I/O error (config persistence, worker spawn).
    Io(std::io::Error),
    /// Configuration validation error.
    Config(String),
}

impl fmt::Display for GlyphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlyphError::Channel(e) => write!(f, "{e}"),
            GlyphError::Script(e) => write!(f, "{e}"),
            GlyphError::Io(e) => write!(f, "I/O error: {e}"),
            GlyphError::Config(e) => write!(f, "Config error: {e}"),
        }
    }
}

impl std::error::Error for GlyphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GlyphError::Channel(e) => Some(e),
            GlyphError::Script(e) => Some(e),
            GlyphError::Io(e) => Some(e),
            GlyphError::Config(_) => None,
        }
    }
}

impl From<ChannelError> for GlyphError {
    fn from(e: ChannelError) -> Self {
        GlyphError::Channel(e)
    }
}

impl From<ScriptError> for GlyphError {
    fn from(e: ScriptError) -> Self {
        GlyphError::Script(e)
    }
}

impl From<std::io::Error> for GlyphError {
    fn from(e: std::io::Error) -> Self {
        GlyphError::Io(e)
    }
}

/// Crate-level Result alias using [`GlyphError`].
pub type Result<T> = std::result::Result<T, GlyphError>;
