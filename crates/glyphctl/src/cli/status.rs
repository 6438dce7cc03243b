//! `status` subcommand — configuration summary and live channel readback.

use super::{
    Channel, ChannelBank, ChannelStateJson, Config, Result, StatusOutput, kv, kv_indent, kv_width,
};

pub(super) fn cmd_status(json: bool) -> Result<()> {
    let config = Config::load();
    let bank = config.channel_bank();

    let channels: Vec<ChannelStateJson> = Channel::ALL
        .into_iter()
        .map(|ch| ChannelStateJson {
            name: ch.name().to_string(),
            path: bank.path(ch).display().to_string(),
            value: bank.read(ch).ok(),
        })
        .collect();

    if json {
        let output = StatusOutput {
            version: env!("CARGO_PKG_VERSION").to_string(),
            enabled: config.enabled,
            brightness_level: config.brightness,
            brightness_value: config.brightness_value(),
            animations_dir: config.animations_dir.clone(),
            channels,
        };
        let json_str = serde_json::to_string_pretty(&output).map_err(|e| {
            glyphctl_lib::GlyphError::Config(format!("JSON serialization failed: {e}"))
        })?;
        println!("{json_str}");
        return Ok(());
    }

    // Human-readable output
    let w = kv_width(
        &["Version:", "Glyph:", "Brightness:", "Animations:"],
        &[
            "camera_ring:",
            "center_ring:",
            "bar:",
            "dot:",
            "slant:",
        ],
    );

    kv("Version:", env!("CARGO_PKG_VERSION"), w);
    kv(
        "Glyph:",
        if config.enabled { "enabled" } else { "disabled" },
        w,
    );
    kv(
        "Brightness:",
        format_args!(
            "level {} (raw {})",
            config.brightness,
            config.brightness_value()
        ),
        w,
    );
    kv("Animations:", &config.animations_dir, w);
    println!();

    println!("Channels:");
    for ch in channels {
        let value = match ch.value {
            Some(v) => v.to_string(),
            None => "(unavailable)".to_string(),
        };
        kv_indent(&format!("{}:", ch.name), value, w);
    }
    Ok(())
}
