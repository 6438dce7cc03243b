//! `play` subcommand — run one animation to completion.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use super::{
    Admission, AnimationPlayer, Config, DirScriptSource, PlayerOptions, Result, StatusRegistry,
};

/// Play one animation and block until the worker has drained. Playback-time
/// failures (missing script, unwritable channels) are best-effort and
/// intentionally not surfaced — the channels end at zero either way.
pub(super) fn cmd_play(name: &str, wait: bool) -> Result<()> {
    let config = Config::load();
    if !config.enabled {
        println!("Glyph is disabled in config; nothing to play.");
        return Ok(());
    }

    let bank = Arc::new(config.channel_bank());
    let source = DirScriptSource::new(config.animations_dir.as_str());
    let status = Arc::new(StatusRegistry::new());
    let options = PlayerOptions {
        brightness: config.brightness_value(),
        ..PlayerOptions::default()
    };
    let player = AnimationPlayer::spawn(bank, source, status, options)?;

    // Ctrl+C aborts the in-flight playback at the next frame boundary; the
    // player's cleanup still zeroes the channels.
    let interrupt = player.interrupt_handle();
    if let Err(e) = ctrlc::set_handler(move || interrupt.store(true, Ordering::SeqCst)) {
        log::warn!("could not install Ctrl+C handler: {e}");
    }

    match player.play(name, wait) {
        Admission::Accepted => {}
        Admission::RejectedAllLed => println!("All LEDs are active; animation skipped."),
        Admission::RejectedBusy => println!("Another animation is playing; request dropped."),
        Admission::RejectedShutdown => println!("Player is shutting down; request dropped."),
    }
    player.finish();
    Ok(())
}
