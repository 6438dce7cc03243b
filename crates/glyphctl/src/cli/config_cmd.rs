//! `config` subcommand — show current configuration and file paths.

use super::{Config, ConfigOutput, Result, kv, kv_indent, kv_width};

pub(super) fn cmd_config(json: bool) -> Result<()> {
    let (config, warnings) = Config::load_with_warnings();
    for w in &warnings {
        log::warn!("{w}");
    }
    let config_path = Config::path();
    let config_exists = config_path.as_ref().map(|p| p.exists()).unwrap_or(false);
    let problems: Vec<String> = config.validate().iter().map(ToString::to_string).collect();

    if json {
        let output = ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings: config,
            problems,
        };
        let json_str = serde_json::to_string_pretty(&output).map_err(|e| {
            glyphctl_lib::GlyphError::Config(format!("JSON serialization failed: {e}"))
        })?;
        println!("{json_str}");
        return Ok(());
    }

    // Human-readable output
    let w = kv_width(
        &["Config file:"],
        &["enabled:", "brightness:", "animations_dir:", "channel_paths:"],
    );

    match &config_path {
        Some(p) => {
            if config_exists {
                kv("Config file:", format_args!("{} (loaded)", p.display()), w);
            } else {
                kv(
                    "Config file:",
                    format_args!("{} (not found, using defaults)", p.display()),
                    w,
                );
            }
        }
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Settings:");
    kv_indent("enabled:", config.enabled, w);
    kv_indent(
        "brightness:",
        format_args!(
            "level {} (raw {})",
            config.brightness,
            config.brightness_value()
        ),
        w,
    );
    kv_indent("animations_dir:", &config.animations_dir, w);
    if config.channel_paths.is_empty() {
        kv_indent("channel_paths:", "(defaults)", w);
    } else {
        let mut overrides: Vec<_> = config.channel_paths.iter().collect();
        overrides.sort();
        for (name, path) in overrides {
            kv_indent(&format!("{name}:"), path, w);
        }
    }

    if !problems.is_empty() {
        println!();
        println!("Problems:");
        for p in &problems {
            println!("  {p}");
        }
    }
    Ok(())
}
