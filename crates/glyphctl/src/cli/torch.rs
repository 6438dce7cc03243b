//! `torch` subcommand — force all LEDs fully on or off.
//!
//! In a long-lived process the torch collaborator also raises
//! `StatusRegistry::set_all_led_active` so the player rejects playback while
//! torch is on; the one-shot CLI variant only drives the channel files.

use clap::ValueEnum;

use super::{Channel, ChannelBank, Config, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TorchState {
    On,
    Off,
}

pub(super) fn cmd_torch(state: TorchState) -> Result<()> {
    let config = Config::load();
    if state == TorchState::On && !config.enabled {
        println!("Glyph is disabled in config; torch not lit.");
        return Ok(());
    }

    let bank = config.channel_bank();
    let value = match state {
        TorchState::On => config.brightness_value(),
        TorchState::Off => 0,
    };

    // Unlike playback, torch is a direct user command — surface write errors.
    for ch in Channel::ALL {
        bank.write(ch, value)?;
    }

    match state {
        TorchState::On => println!("All LEDs on (raw {value})."),
        TorchState::Off => println!("All LEDs off."),
    }
    Ok(())
}
