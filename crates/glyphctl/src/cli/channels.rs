//! `channels` subcommand — list glyph channels and their sysfs paths.

use super::{Channel, ChannelJson, ChannelsOutput, Config, Result, kv_indent, kv_width};

pub(super) fn cmd_channels(json: bool) -> Result<()> {
    let config = Config::load();
    let bank = config.channel_bank();

    let channels: Vec<ChannelJson> = Channel::ALL
        .into_iter()
        .map(|ch| ChannelJson {
            name: ch.name().to_string(),
            path: bank.path(ch).display().to_string(),
        })
        .collect();

    if json {
        let output = ChannelsOutput {
            count: channels.len(),
            channels,
        };
        let json_str = serde_json::to_string_pretty(&output).map_err(|e| {
            glyphctl_lib::GlyphError::Config(format!("JSON serialization failed: {e}"))
        })?;
        println!("{json_str}");
        return Ok(());
    }

    let keys: Vec<String> = channels.iter().map(|ch| format!("{}:", ch.name)).collect();
    let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
    let w = kv_width(&[], &key_refs);

    println!("Channels ({}):", channels.len());
    for ch in &channels {
        kv_indent(&format!("{}:", ch.name), &ch.path, w);
    }
    Ok(())
}
