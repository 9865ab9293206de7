//! Signal handling for the automation daemon.
//!
//! A background thread turns process signals into `SignalMessage`s on an
//! `mpsc` channel. The run loop waits on that channel between evaluations,
//! so a signal interrupts a long sleep immediately.
//!
//! - SIGINT / SIGTERM: shut down
//! - SIGHUP / SIGUSR2: reload configuration and library (Unix only)

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    sync::mpsc::{Receiver, RecvTimeoutError},
    time::Duration,
};

use crate::constants::CHECK_INTERVAL_SECS;
use crate::logger::Log;

/// Unified signal message type for all signal-based communication
#[derive(Debug, Clone, PartialEq)]
pub enum SignalMessage {
    /// Configuration reload signal (SIGHUP, SIGUSR2)
    Reload,
    /// Shutdown signal (SIGTERM, SIGINT)
    Shutdown,
}

/// Signal handling state shared between threads
pub struct SignalState {
    /// Atomic flag indicating if the application should keep running
    pub running: Arc<AtomicBool>,
    /// Channel receiver for unified signal messages
    pub signal_receiver: Receiver<SignalMessage>,
}

impl SignalState {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Wait for a signal until the wall clock reaches `target`.
    ///
    /// Returns `None` once `clock()` is at or past `target` without a signal.
    /// The clock is read again every `CHECK_INTERVAL_SECS`, so time spent in
    /// system suspend counts towards the wait.
    pub fn wait_until<C>(&self, target: NaiveDateTime, clock: C) -> Option<SignalMessage>
    where
        C: Fn() -> NaiveDateTime,
    {
        let check_interval = Duration::from_secs(CHECK_INTERVAL_SECS);

        loop {
            if !self.is_running() {
                return Some(SignalMessage::Shutdown);
            }

            let remaining = (target - clock()).to_std().unwrap_or(Duration::ZERO);
            if remaining.is_zero() {
                return None;
            }

            let slice = check_interval.min(remaining);
            match self.signal_receiver.recv_timeout(slice) {
                Ok(message) => return Some(message),
                Err(RecvTimeoutError::Timeout) => {}
                // No sender left: only the running flag can stop us now
                Err(RecvTimeoutError::Disconnected) => std::thread::sleep(slice),
            }
        }
    }
}

/// Set up signal handling for the application.
///
/// Returns a SignalState containing the running flag and signal receiver channel.
/// Spawns a background thread that monitors for signals and sends appropriate
/// messages via the channel.
#[cfg(unix)]
pub fn setup_signal_handler() -> Result<SignalState> {
    use signal_hook::{
        consts::signal::{SIGHUP, SIGINT, SIGTERM, SIGUSR2},
        iterator::Signals,
    };

    let running = Arc::new(AtomicBool::new(true));
    let (signal_sender, signal_receiver) = std::sync::mpsc::channel::<SignalMessage>();

    let mut signals = Signals::new([SIGINT, SIGTERM, SIGHUP, SIGUSR2])
        .context("failed to register signal handlers")?;

    let running_clone = running.clone();

    std::thread::spawn(move || {
        for sig in signals.forever() {
            let message = match sig {
                SIGHUP | SIGUSR2 => {
                    Log::log_pipe();
                    Log::log_info("Reload signal received");
                    SignalMessage::Reload
                }
                _ => {
                    Log::log_pipe();
                    Log::log_info(&format!("Shutdown signal received: {}", sig));
                    running_clone.store(false, Ordering::SeqCst);
                    SignalMessage::Shutdown
                }
            };

            if signal_sender.send(message).is_err() {
                // Main loop is gone
                break;
            }
        }
    });

    Ok(SignalState {
        running,
        signal_receiver,
    })
}

/// Set up signal handling for the application.
///
/// Windows only delivers Ctrl+C style termination, which clears the running
/// flag directly.
#[cfg(not(unix))]
pub fn setup_signal_handler() -> Result<SignalState> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};

    let running = Arc::new(AtomicBool::new(true));
    let (_signal_sender, signal_receiver) = std::sync::mpsc::channel::<SignalMessage>();

    for sig in [SIGINT, SIGTERM] {
        let running_clone = running.clone();
        // SAFETY: the handler only performs an atomic store
        unsafe {
            signal_hook::low_level::register(sig, move || {
                running_clone.store(false, Ordering::SeqCst);
            })
        }
        .context("failed to register signal handlers")?;
    }

    Ok(SignalState {
        running,
        signal_receiver,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, NaiveDate};
    use std::cell::Cell;
    use std::sync::mpsc;

    fn test_state() -> (SignalState, mpsc::Sender<SignalMessage>) {
        let (sender, receiver) = mpsc::channel();
        (
            SignalState {
                running: Arc::new(AtomicBool::new(true)),
                signal_receiver: receiver,
            },
            sender,
        )
    }

    fn local_now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_wait_times_out_without_signal() {
        let (state, _sender) = test_state();
        let target = local_now() + chrono::Duration::milliseconds(20);
        assert_eq!(state.wait_until(target, local_now), None);
        assert_eq!(state.wait_until(local_now(), local_now), None);
    }

    #[test]
    fn test_wait_returns_at_once_for_past_target() {
        let (state, _sender) = test_state();
        assert_eq!(state.wait_until(at(9, 0), || at(10, 0)), None);
    }

    #[test]
    fn test_wait_ends_when_wall_clock_jumps_past_target() {
        // First reading is before the target; every later reading is after a
        // long suspend that carried the wall clock past it
        let (state, _sender) = test_state();
        let readings = Cell::new(0);
        let clock = || {
            let n = readings.get();
            readings.set(n + 1);
            if n == 0 { at(8, 0) } else { at(18, 0) }
        };

        assert_eq!(state.wait_until(at(10, 0), clock), None);
        assert_eq!(readings.get(), 2);
    }

    #[test]
    fn test_wait_returns_pending_message() {
        let (state, sender) = test_state();
        sender.send(SignalMessage::Reload).unwrap();
        assert_eq!(
            state.wait_until(at(23, 0), || at(8, 0)),
            Some(SignalMessage::Reload)
        );
    }

    #[test]
    fn test_wait_stops_when_running_cleared() {
        let (state, _sender) = test_state();
        state.running.store(false, Ordering::SeqCst);
        assert!(!state.is_running());
        assert_eq!(
            state.wait_until(at(23, 0), || at(8, 0)),
            Some(SignalMessage::Shutdown)
        );
    }

    #[test]
    fn test_wait_survives_disconnected_sender() {
        let (state, sender) = test_state();
        drop(sender);
        let target = local_now() + chrono::Duration::milliseconds(20);
        assert_eq!(state.wait_until(target, local_now), None);
    }
}
