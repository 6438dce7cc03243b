//! Animation playback engine — single worker, admission gate, guaranteed cleanup.
//!
//! One dedicated worker thread plays animations strictly one at a time, in
//! submission order. Admission is decided synchronously on the calling thread;
//! accepted requests are queued and best-effort from then on — playback-time
//! failures are logged and swallowed, never surfaced to the caller. Every
//! playback attempt ends with all five channels zeroed and the activity flag
//! cleared, regardless of how it ended.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::channel::{Channel, ChannelBank};
use crate::config::MAX_BRIGHTNESS;
use crate::script::ScriptSource;
use crate::status::StatusRegistry;

/// Delay between consecutive frames.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(10);

/// Upper bound on how long a `wait`-flagged playback parks for the previous
/// animation's cleanup before giving up.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Slice length for the idle wait, so shutdown is noticed promptly.
const WAIT_POLL_SLICE: Duration = Duration::from_millis(50);

/// Playback tuning knobs.
#[derive(Debug, Clone)]
pub struct PlayerOptions {
    /// Raw brightness scale; frame percentages map to `round(pct/100 * brightness)`.
    pub brightness: u32,
    pub frame_interval: Duration,
    pub wait_timeout: Duration,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        PlayerOptions {
            brightness: MAX_BRIGHTNESS,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }
}

/// Outcome of the synchronous admission check.
///
/// Rejections are not errors — a higher-priority LED state simply wins and the
/// request evaporates. The variant exists so callers and tests can observe the
/// decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Queued for playback.
    Accepted,
    /// All LEDs are forced active; the request was skipped entirely.
    RejectedAllLed,
    /// An animation is already playing and `wait` was false; the request was
    /// dropped, not queued.
    RejectedBusy,
    /// The worker has already exited (player shutting down); the request was
    /// dropped.
    RejectedShutdown,
}

impl Admission {
    pub fn accepted(self) -> bool {
        self == Admission::Accepted
    }
}

/// Scale a frame percentage to a raw channel value.
///
/// Rounds half away from zero. Out-of-range percentages are not validated;
/// the cast saturates at the `u32` bounds (negative results clamp to 0).
pub fn scale_brightness(pct: f32, scale: u32) -> u32 {
    ((pct / 100.0) * scale as f32).round() as u32
}

struct Job {
    name: String,
    wait: bool,
}

/// Sequential animation player. Owns the worker thread; dropping the player
/// aborts an in-flight playback at its next frame boundary (cleanup still
/// runs) and discards queued jobs. Use [`finish`](Self::finish) to drain
/// gracefully instead.
pub struct AnimationPlayer {
    status: Arc<StatusRegistry>,
    tx: Option<mpsc::Sender<Job>>,
    shutdown: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl AnimationPlayer {
    /// Start the worker thread.
    pub fn spawn<B, S>(
        bank: Arc<B>,
        source: S,
        status: Arc<StatusRegistry>,
        options: PlayerOptions,
    ) -> crate::error::Result<AnimationPlayer>
    where
        B: ChannelBank + Send + Sync + 'static,
        S: ScriptSource + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Job>();
        let shutdown = Arc::new(AtomicBool::new(false));
        let worker = {
            let status = Arc::clone(&status);
            let shutdown = Arc::clone(&shutdown);
            thread::Builder::new()
                .name("glyph-player".into())
                .spawn(move || worker_loop(rx, bank, source, status, options, shutdown))?
        };
        Ok(AnimationPlayer {
            status,
            tx: Some(tx),
            shutdown,
            worker: Some(worker),
        })
    }

    /// Request playback of the named animation.
    ///
    /// The admission check runs synchronously; accepted requests are queued
    /// FIFO onto the worker and this call returns immediately. With
    /// `wait == false` a request submitted while another animation is playing
    /// is dropped; with `wait == true` it queues and the worker parks until
    /// the previous playback's cleanup has cleared the activity flag.
    pub fn play(&self, name: &str, wait: bool) -> Admission {
        log::debug!("playing animation | name: {name} | wait: {wait}");

        if self.status.is_all_led_active() {
            log::debug!("all LEDs active, skipping animation | name: {name}");
            return Admission::RejectedAllLed;
        }
        if !wait && self.status.is_animation_active() {
            log::debug!("animation already active, dropping request | name: {name}");
            return Admission::RejectedBusy;
        }

        let job = Job {
            name: name.to_string(),
            wait,
        };
        match &self.tx {
            Some(tx) if tx.send(job).is_ok() => Admission::Accepted,
            _ => {
                log::warn!("player worker is gone, dropping request | name: {name}");
                Admission::RejectedShutdown
            }
        }
    }

    /// The shared activity flags this player reports through.
    pub fn status(&self) -> &Arc<StatusRegistry> {
        &self.status
    }

    /// Flag that aborts an in-flight playback at its next frame boundary when
    /// set (e.g. from a Ctrl+C handler). Cleanup still runs.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Close the queue and block until every accepted playback has finished.
    pub fn finish(mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::warn!("player worker panicked");
        }
    }
}

impl Drop for AnimationPlayer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.tx.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::warn!("player worker panicked");
        }
    }
}

fn worker_loop<B, S>(
    rx: mpsc::Receiver<Job>,
    bank: Arc<B>,
    source: S,
    status: Arc<StatusRegistry>,
    options: PlayerOptions,
    shutdown: Arc<AtomicBool>,
) where
    B: ChannelBank + Send + Sync + 'static,
    S: ScriptSource,
{
    while let Ok(job) = rx.recv() {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }
        run_playback(&job, bank.as_ref(), &source, &status, &options, &shutdown);
    }
}

/// Zeroes every channel and clears the activity flag when dropped, no matter
/// how the frame loop exited (normal end, load failure, write failure,
/// shutdown).
struct CleanupGuard<'a, B: ChannelBank + ?Sized> {
    bank: &'a B,
    status: &'a StatusRegistry,
    name: &'a str,
}

impl<B: ChannelBank + ?Sized> Drop for CleanupGuard<'_, B> {
    fn drop(&mut self) {
        // The flag is still high here iff the frame loop actually started.
        let started = self.status.is_animation_active();
        if let Err(e) = self.bank.clear_all() {
            log::warn!("cleanup write failed | name: {}: {e}", self.name);
        }
        self.status.set_animation_active(false);
        if started {
            log::debug!("done playing animation | name: {}", self.name);
        }
    }
}

fn run_playback<B: ChannelBank + ?Sized, S: ScriptSource>(
    job: &Job,
    bank: &B,
    source: &S,
    status: &StatusRegistry,
    options: &PlayerOptions,
    shutdown: &AtomicBool,
) {
    if job.wait && status.is_animation_active() {
        log::debug!("animation already active, waiting | name: {}", job.name);
        let deadline = Instant::now() + options.wait_timeout;
        while !status.wait_animation_idle(WAIT_POLL_SLICE) {
            if shutdown.load(Ordering::SeqCst) {
                return;
            }
            if Instant::now() >= deadline {
                // The previous playback's cleanup never ran; its channels and
                // flag are not ours to touch. Abandon this request.
                log::warn!(
                    "timed out waiting for previous animation | name: {}",
                    job.name
                );
                return;
            }
        }
    }

    // From here on, every exit path zeroes the channels and clears the flag.
    let _cleanup = CleanupGuard {
        bank,
        status,
        name: &job.name,
    };

    let script = match source.load(&job.name) {
        Ok(script) => script,
        Err(e) => {
            log::debug!("could not load animation | name: {}: {e}", job.name);
            return;
        }
    };

    status.set_animation_active(true);
    for frame in &script.frames {
        if shutdown.load(Ordering::SeqCst) {
            log::debug!("interrupted mid-animation | name: {}", job.name);
            break;
        }
        for ch in Channel::ALL {
            let value = scale_brightness(frame.get(ch), options.brightness);
            if let Err(e) = bank.write(ch, value) {
                log::warn!("channel write failed mid-animation | name: {}: {e}", job.name);
                return;
            }
        }
        thread::sleep(options.frame_interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mock::MockBank;
    use crate::script::mock::StaticSource;

    fn fast_options(brightness: u32) -> PlayerOptions {
        PlayerOptions {
            brightness,
            frame_interval: Duration::from_millis(1),
            wait_timeout: Duration::from_millis(200),
        }
    }

    fn spawn_player(
        bank: &Arc<MockBank>,
        source: StaticSource,
        status: &Arc<StatusRegistry>,
        brightness: u32,
    ) -> AnimationPlayer {
        AnimationPlayer::spawn(
            Arc::clone(bank),
            source,
            Arc::clone(status),
            fast_options(brightness),
        )
        .unwrap()
    }

    // ── scaling ──

    #[test]
    fn scale_half_of_max_rounds_up() {
        assert_eq!(scale_brightness(50.0, 4095), 2048);
    }

    #[test]
    fn scale_zero_and_full() {
        assert_eq!(scale_brightness(0.0, 4095), 0);
        assert_eq!(scale_brightness(100.0, 4095), 4095);
    }

    #[test]
    fn scale_with_zero_brightness_is_zero() {
        assert_eq!(scale_brightness(100.0, 0), 0);
    }

    #[test]
    fn scale_out_of_range_passes_through() {
        assert_eq!(scale_brightness(150.0, 100), 150);
        // Negative results saturate at the u32 floor
        assert_eq!(scale_brightness(-50.0, 100), 0);
    }

    // ── admission ──

    #[test]
    fn all_led_active_rejects_everything() {
        let bank = Arc::new(MockBank::new());
        let mut source = StaticSource::new();
        source.insert("blink", vec![[100.0; 5]]);
        let status = Arc::new(StatusRegistry::new());
        status.set_all_led_active(true);

        let player = spawn_player(&bank, source, &status, 4095);
        assert_eq!(player.play("blink", false), Admission::RejectedAllLed);
        assert_eq!(player.play("blink", true), Admission::RejectedAllLed);
        player.finish();

        assert!(bank.writes().is_empty());
        assert!(!status.is_animation_active());
    }

    #[test]
    fn busy_without_wait_is_dropped() {
        let bank = Arc::new(MockBank::new());
        let status = Arc::new(StatusRegistry::new());
        let player = spawn_player(&bank, StaticSource::new(), &status, 4095);

        status.set_animation_active(true);
        assert_eq!(player.play("blink", false), Admission::RejectedBusy);
        status.set_animation_active(false);
        player.finish();

        assert!(bank.writes().is_empty());
    }

    #[test]
    fn wait_timeout_abandons_without_writes() {
        let bank = Arc::new(MockBank::new());
        let mut source = StaticSource::new();
        source.insert("queued", vec![[100.0; 5]]);
        let status = Arc::new(StatusRegistry::new());

        let player = spawn_player(&bank, source, &status, 4095);
        // Pin the flag high, as if a prior playback's cleanup hung. The
        // worker's wait must expire without the queued job writing anything:
        // the channels and the flag still belong to the stuck playback.
        status.set_animation_active(true);
        assert_eq!(player.play("queued", true), Admission::Accepted);
        player.finish();

        assert!(bank.writes().is_empty(), "no frame or cleanup writes");
        assert!(status.is_animation_active(), "flag left untouched");
    }

    #[test]
    fn play_after_worker_exit_is_rejected() {
        let bank = Arc::new(MockBank::new());
        let status = Arc::new(StatusRegistry::new());
        let player = spawn_player(&bank, StaticSource::new(), &status, 4095);

        // An interrupt makes the worker exit after the next job it receives.
        player
            .interrupt_handle()
            .store(true, std::sync::atomic::Ordering::SeqCst);
        assert_eq!(player.play("first", false), Admission::Accepted);

        // Once the worker is gone, submissions are reported as dropped, not
        // silently accepted.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        loop {
            match player.play("second", false) {
                Admission::RejectedShutdown => break,
                Admission::Accepted => {
                    assert!(
                        std::time::Instant::now() < deadline,
                        "worker never exited"
                    );
                    thread::sleep(Duration::from_millis(2));
                }
                other => panic!("unexpected admission: {other:?}"),
            }
        }
        assert!(bank.writes().is_empty());
    }

    // ── playback ──

    #[test]
    fn single_frame_scaled_then_zeroed() {
        let bank = Arc::new(MockBank::new());
        let mut source = StaticSource::new();
        source.insert("half", vec![[50.0; 5]]);
        let status = Arc::new(StatusRegistry::new());

        let player = spawn_player(&bank, source, &status, 4095);
        assert!(player.play("half", false).accepted());
        player.finish();

        let expected: Vec<(Channel, u32)> = Channel::ALL
            .into_iter()
            .map(|ch| (ch, 2048))
            .chain(Channel::ALL.into_iter().map(|ch| (ch, 0)))
            .collect();
        assert_eq!(bank.writes(), expected);
        assert!(!status.is_animation_active());
    }

    #[test]
    fn empty_script_just_zeroes() {
        let bank = Arc::new(MockBank::new());
        let mut source = StaticSource::new();
        source.insert("nothing", vec![]);
        let status = Arc::new(StatusRegistry::new());

        let player = spawn_player(&bank, source, &status, 4095);
        assert!(player.play("nothing", false).accepted());
        player.finish();

        let expected: Vec<(Channel, u32)> =
            Channel::ALL.into_iter().map(|ch| (ch, 0)).collect();
        assert_eq!(bank.writes(), expected);
        assert!(!status.is_animation_active());
    }

    #[test]
    fn missing_script_still_cleans_up() {
        let bank = Arc::new(MockBank::new());
        let status = Arc::new(StatusRegistry::new());

        let player = spawn_player(&bank, StaticSource::new(), &status, 4095);
        assert!(player.play("ghost", false).accepted());
        player.finish();

        assert!(bank.all_zero());
        assert_eq!(bank.writes().len(), Channel::COUNT);
        assert!(!status.is_animation_active());
    }

    #[test]
    fn write_failure_aborts_playback_but_cleans_up() {
        let bank = Arc::new(MockBank::new());
        bank.fail_on(Channel::Bar);
        let mut source = StaticSource::new();
        source.insert("blink", vec![[100.0; 5], [100.0; 5], [100.0; 5]]);
        let status = Arc::new(StatusRegistry::new());

        let player = spawn_player(&bank, source, &status, 4095);
        assert!(player.play("blink", false).accepted());
        player.finish();

        // The four healthy channels end at zero; the failing one was never
        // recorded at all.
        for ch in Channel::ALL {
            if ch == Channel::Bar {
                assert_eq!(bank.last_value(ch), None);
            } else {
                assert_eq!(bank.last_value(ch), Some(0));
            }
        }
        assert!(!status.is_animation_active());
    }

    #[test]
    fn flag_clear_after_each_of_two_playbacks() {
        let bank = Arc::new(MockBank::new());
        let mut source = StaticSource::new();
        source.insert("a", vec![[10.0; 5]]);
        source.insert("b", vec![[20.0; 5]]);
        let status = Arc::new(StatusRegistry::new());

        let player = spawn_player(&bank, source, &status, 100);
        assert!(player.play("a", false).accepted());
        assert!(player.play("b", true).accepted());
        player.finish();

        // a's frames, a's zeros, b's frames, b's zeros — strictly serialized
        let camera: Vec<u32> = bank
            .writes()
            .into_iter()
            .filter(|(ch, _)| *ch == Channel::CameraRing)
            .map(|(_, v)| v)
            .collect();
        assert_eq!(camera, vec![10, 0, 20, 0]);
        assert!(!status.is_animation_active());
    }
}
