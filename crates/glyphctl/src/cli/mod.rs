//! CLI subcommands — playback, status, channel listing, torch mode.

mod channels;
mod config_cmd;
mod play;
mod status;
mod torch;

use clap::Subcommand;
use serde::Serialize;

pub use torch::TorchState;

pub(super) use glyphctl_lib::channel::{Channel, ChannelBank};
pub(super) use glyphctl_lib::config::Config;
pub(super) use glyphctl_lib::error::Result;
pub(super) use glyphctl_lib::player::{Admission, AnimationPlayer, PlayerOptions};
pub(super) use glyphctl_lib::script::DirScriptSource;
pub(super) use glyphctl_lib::status::StatusRegistry;

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{key:<width$}{value}", width = w);
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct StatusOutput {
    pub version: String,
    pub enabled: bool,
    pub brightness_level: u8,
    pub brightness_value: u32,
    pub animations_dir: String,
    pub channels: Vec<ChannelStateJson>,
}

#[derive(Serialize)]
pub(super) struct ChannelStateJson {
    pub name: String,
    pub path: String,
    /// Current raw brightness, or null if the sysfs file is unreadable.
    pub value: Option<u32>,
}

#[derive(Serialize)]
pub(super) struct ChannelsOutput {
    pub count: usize,
    pub channels: Vec<ChannelJson>,
}

#[derive(Serialize)]
pub(super) struct ChannelJson {
    pub name: String,
    pub path: String,
}

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
    pub problems: Vec<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Play an animation to completion (resolves anim_<name>.csv in the animations dir)
    Play {
        /// Animation name
        name: String,
        /// Queue behind a running animation instead of dropping the request
        #[arg(long)]
        wait: bool,
    },

    /// Show configuration summary and live channel readback
    Status,

    /// List glyph channels and their sysfs paths
    Channels,

    /// Force all LEDs fully on or off
    Torch {
        #[arg(value_enum)]
        state: TorchState,
    },

    /// Show current configuration and file paths
    Config,
}

/// Warn if `--json` was passed to a command that doesn't support it.
fn warn_json_unsupported(cmd_name: &str) {
    log::warn!("--json is not supported for `{cmd_name}` (ignored)");
}

pub fn run(cmd: Command, json: bool) -> Result<()> {
    match cmd {
        Command::Play { name, wait } => {
            if json {
                warn_json_unsupported("play");
            }
            play::cmd_play(&name, wait)
        }
        Command::Status => status::cmd_status(json),
        Command::Channels => channels::cmd_channels(json),
        Command::Torch { state } => {
            if json {
                warn_json_unsupported("torch");
            }
            torch::cmd_torch(state)
        }
        Command::Config => config_cmd::cmd_config(json),
    }
}
