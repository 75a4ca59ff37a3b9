//! Real-time pump for a player
//!
//! The host event loop owns the player. Plugin callbacks arrive over a
//! channel, and the player clock is brought up to wall time before each one
//! is handled and whenever a timer falls due. Everything runs on the calling
//! task, so a player is never touched from two places at once.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::file::MediaFile;
use crate::plugin::NativeSignal;
use crate::timer::MIN_PERIOD;
use crate::MediaPlayerAdapter;

/// Longest the pump sleeps without moving the player clock
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Messages the host sends to a driven player
#[derive(Debug, Clone)]
pub enum HostCommand {
    /// A callback fired by the plugin runtime
    Signal(NativeSignal),
    Load(MediaFile),
    /// Destroy the player and stop the pump
    Shutdown,
}

/// Create the command channel for `drive`
pub fn channel(capacity: usize) -> (mpsc::Sender<HostCommand>, mpsc::Receiver<HostCommand>) {
    mpsc::channel(capacity)
}

/// Pump `player` until `Shutdown` arrives or every sender is dropped.
///
/// `tick` bounds how long the clock may lag behind wall time while no timer
/// is pending. The player is destroyed before this returns.
pub async fn drive<P>(player: &mut P, mut commands: mpsc::Receiver<HostCommand>, tick: Duration)
where
    P: MediaPlayerAdapter + ?Sized,
{
    let tick = tick.max(MIN_PERIOD);
    let mut last = Instant::now();

    loop {
        let timers = player.base().timers();
        let wait = timers
            .next_due()
            .map_or(tick, |due| due.saturating_sub(timers.now()).min(tick));

        tokio::select! {
            cmd = commands.recv() => {
                // polls started by this command count from now, not from the last wake
                catch_up(player, &mut last);
                match cmd {
                    Some(HostCommand::Signal(signal)) => {
                        log::trace!("driver: {:?}", signal);
                        player.on_native_signal(signal);
                    }
                    Some(HostCommand::Load(file)) => player.load(file),
                    Some(HostCommand::Shutdown) | None => break,
                }
            }
            _ = time::sleep_until(last + wait) => catch_up(player, &mut last),
        }
    }

    log::debug!("driver stopping {} player", player.kind());
    player.destroy();
}

fn catch_up<P>(player: &mut P, last: &mut Instant)
where
    P: MediaPlayerAdapter + ?Sized,
{
    let now = Instant::now();
    player.advance(now.duration_since(*last));
    *last = now;
}
