//! Integration tests: end-to-end playback sequences using MockBank.
//!
//! These tests exercise the full admission → frame loop → cleanup cycle
//! through the public API, including the cross-playback ordering guarantees
//! that need a live worker thread and real timing.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glyphctl_lib::channel::Channel;
use glyphctl_lib::channel::mock::MockBank;
use glyphctl_lib::player::{Admission, AnimationPlayer, PlayerOptions};
use glyphctl_lib::script::mock::StaticSource;
use glyphctl_lib::status::StatusRegistry;

/// Brightness of 100 makes frame percentages map 1:1 to raw values.
const SCALE: u32 = 100;

fn options(frame_interval: Duration) -> PlayerOptions {
    PlayerOptions {
        brightness: SCALE,
        frame_interval,
        wait_timeout: Duration::from_secs(5),
    }
}

fn spawn(
    bank: &Arc<MockBank>,
    source: StaticSource,
    status: &Arc<StatusRegistry>,
    frame_interval: Duration,
) -> AnimationPlayer {
    AnimationPlayer::spawn(
        Arc::clone(bank),
        source,
        Arc::clone(status),
        options(frame_interval),
    )
    .unwrap()
}

/// Block until the activity flag is raised, or panic after one second.
fn wait_until_active(status: &StatusRegistry) {
    let deadline = Instant::now() + Duration::from_secs(1);
    while !status.is_animation_active() {
        assert!(Instant::now() < deadline, "worker never started playback");
        std::thread::sleep(Duration::from_millis(1));
    }
}

/// Values written to one channel, in write order.
fn channel_values(bank: &MockBank, channel: Channel) -> Vec<u32> {
    bank.writes()
        .into_iter()
        .filter(|(ch, _)| *ch == channel)
        .map(|(_, v)| v)
        .collect()
}

#[test]
fn full_playback_writes_every_frame_then_zeroes() {
    let bank = Arc::new(MockBank::new());
    let mut source = StaticSource::new();
    source.insert(
        "ramp",
        vec![[25.0; 5], [50.0; 5], [75.0; 5]],
    );
    let status = Arc::new(StatusRegistry::new());

    let player = spawn(&bank, source, &status, Duration::from_millis(1));
    assert_eq!(player.play("ramp", false), Admission::Accepted);
    player.finish();

    for ch in Channel::ALL {
        assert_eq!(channel_values(&bank, ch), vec![25, 50, 75, 0]);
    }
    assert!(bank.all_zero());
    assert!(!status.is_animation_active());
}

#[test]
fn second_fire_and_forget_is_dropped_while_playing() {
    let bank = Arc::new(MockBank::new());
    let mut source = StaticSource::new();
    source.insert("slow", vec![[10.0; 5]; 30]);
    let status = Arc::new(StatusRegistry::new());

    let player = spawn(&bank, source, &status, Duration::from_millis(10));
    assert_eq!(player.play("slow", false), Admission::Accepted);
    wait_until_active(&status);
    assert_eq!(player.play("slow", false), Admission::RejectedBusy);
    player.finish();

    // Exactly one full frame sequence: 30 frames then the cleanup zero.
    assert_eq!(
        channel_values(&bank, Channel::CameraRing),
        [vec![10; 30], vec![0]].concat()
    );
}

#[test]
fn wait_request_plays_only_after_prior_cleanup() {
    let bank = Arc::new(MockBank::new());
    let mut source = StaticSource::new();
    source.insert("first", vec![[10.0; 5]; 20]);
    source.insert("second", vec![[20.0; 5]; 5]);
    let status = Arc::new(StatusRegistry::new());

    let player = spawn(&bank, source, &status, Duration::from_millis(10));
    assert_eq!(player.play("first", false), Admission::Accepted);
    wait_until_active(&status);
    assert_eq!(player.play("second", true), Admission::Accepted);
    player.finish();

    // The waiter's first write happens strictly after the prior cleanup zero,
    // on every channel.
    for ch in Channel::ALL {
        assert_eq!(
            channel_values(&bank, ch),
            [vec![10; 20], vec![0], vec![20; 5], vec![0]].concat(),
            "channel {ch}"
        );
    }
    assert!(!status.is_animation_active());
}

#[test]
fn missing_script_returns_immediately_and_zeroes() {
    let bank = Arc::new(MockBank::new());
    let status = Arc::new(StatusRegistry::new());

    let player = spawn(&bank, StaticSource::new(), &status, Duration::from_millis(1));
    let start = Instant::now();
    assert_eq!(player.play("absent", false), Admission::Accepted);
    assert!(
        start.elapsed() < Duration::from_millis(100),
        "submission must not block"
    );
    player.finish();

    assert!(bank.all_zero());
    assert!(!status.is_animation_active());
}

#[test]
fn all_led_active_blocks_any_write() {
    let bank = Arc::new(MockBank::new());
    let mut source = StaticSource::new();
    source.insert("blink", vec![[100.0; 5]]);
    let status = Arc::new(StatusRegistry::new());
    status.set_all_led_active(true);

    let player = spawn(&bank, source, &status, Duration::from_millis(1));
    assert_eq!(player.play("blink", true), Admission::RejectedAllLed);
    player.finish();

    assert!(bank.writes().is_empty());
}

#[test]
fn dropping_player_interrupts_and_cleans_up() {
    let bank = Arc::new(MockBank::new());
    let mut source = StaticSource::new();
    source.insert("forever", vec![[100.0; 5]; 500]);
    let status = Arc::new(StatusRegistry::new());

    let player = spawn(&bank, source, &status, Duration::from_millis(10));
    assert_eq!(player.play("forever", false), Admission::Accepted);
    wait_until_active(&status);

    let start = Instant::now();
    drop(player);
    assert!(
        start.elapsed() < Duration::from_secs(2),
        "drop must not wait for the full script"
    );

    let camera = channel_values(&bank, Channel::CameraRing);
    assert!(camera.len() < 501, "playback should have stopped early");
    assert!(bank.all_zero());
    assert!(!status.is_animation_active());
}

#[test]
fn interrupt_handle_stops_playback_mid_script() {
    let bank = Arc::new(MockBank::new());
    let mut source = StaticSource::new();
    source.insert("forever", vec![[100.0; 5]; 500]);
    let status = Arc::new(StatusRegistry::new());

    let player = spawn(&bank, source, &status, Duration::from_millis(10));
    let interrupt = player.interrupt_handle();
    assert_eq!(player.play("forever", false), Admission::Accepted);
    wait_until_active(&status);

    interrupt.store(true, std::sync::atomic::Ordering::SeqCst);
    player.finish();

    assert!(bank.all_zero());
    assert!(!status.is_animation_active());
}
