//! Scan session driver.
//!
//! A [`ScanSession`] owns the callbacks registered for one scan on one
//! frontend and delivers every notification it receives to each of them.
//!
//! # How It Works
//!
//! 1. The frontend side pushes [`ScanEvent`]s through a [`ScanEventSender`]
//! 2. The session receives them in arrival order from a bounded queue
//! 3. Each event is delivered to every callback; a panicking callback is
//!    logged and skipped, the scan continues
//! 4. The session ends when `end(true)` arrives (if `stop_on_end` is set)
//!    or when every sender has been dropped

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::sync::mpsc;

use tuner_protocol::{ScanCallback, ScanEvent};

/// Scan session configuration.
#[derive(Debug, Clone)]
pub struct ScanSessionConfig {
    /// Capacity of the event queue between the frontend and the session.
    pub event_buffer: usize,
    /// Stop after delivering `end(true)`.
    pub stop_on_end: bool,
}

impl Default for ScanSessionConfig {
    fn default() -> Self {
        Self {
            event_buffer: 64,
            stop_on_end: true,
        }
    }
}

/// Scan session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, not yet running.
    Idle,
    /// Delivering events.
    Scanning,
    /// Finished; no more events are delivered.
    Ended,
}

/// Counters for one session run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSessionStats {
    /// Events delivered to the callbacks.
    pub events_delivered: u64,
    /// Callback invocations that panicked.
    pub callback_failures: u64,
    /// Events still queued when the session ended, never delivered.
    pub events_discarded: u64,
    /// Last reported lock state.
    pub locked: bool,
    /// Whether `end(true)` was seen.
    pub ended: bool,
}

/// Frontend-side handle for pushing notifications into a session.
#[derive(Debug, Clone)]
pub struct ScanEventSender {
    tx: mpsc::Sender<ScanEvent>,
}

impl ScanEventSender {
    /// Queue an event, waiting for room.
    ///
    /// Hands the event back if the session has already ended.
    pub async fn send(&self, event: ScanEvent) -> Result<(), ScanEvent> {
        self.tx.send(event).await.map_err(|e| e.0)
    }

    /// Queue an event from a thread outside the async runtime, such as a
    /// driver callback thread. Must not be called from async code.
    pub fn blocking_send(&self, event: ScanEvent) -> Result<(), ScanEvent> {
        self.tx.blocking_send(event).map_err(|e| e.0)
    }

    /// Returns true if the session is no longer receiving.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Delivers scan notifications to registered callbacks.
pub struct ScanSession {
    /// Incoming events.
    rx: mpsc::Receiver<ScanEvent>,
    /// Registered callbacks, in delivery order.
    callbacks: Vec<Arc<dyn ScanCallback>>,
    /// Configuration.
    config: ScanSessionConfig,
    /// Current state.
    state: SessionState,
    /// Counters.
    stats: ScanSessionStats,
}

impl ScanSession {
    /// Create a new session and the sender that feeds it.
    pub fn new(config: ScanSessionConfig) -> (Self, ScanEventSender) {
        let (tx, rx) = mpsc::channel(config.event_buffer.max(1));
        let session = Self {
            rx,
            callbacks: Vec::new(),
            config,
            state: SessionState::Idle,
            stats: ScanSessionStats::default(),
        };
        (session, ScanEventSender { tx })
    }

    /// Register a callback. Callbacks added after `run` starts are not seen.
    pub fn add_callback(&mut self, callback: Arc<dyn ScanCallback>) {
        self.callbacks.push(callback);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn stats(&self) -> &ScanSessionStats {
        &self.stats
    }

    /// Run the session in a background task.
    pub fn spawn(mut self) -> tokio::task::JoinHandle<ScanSessionStats> {
        tokio::spawn(async move { self.run().await })
    }

    /// Deliver events until the scan ends.
    pub async fn run(&mut self) -> ScanSessionStats {
        if self.state == SessionState::Ended {
            warn!("ScanSession: run called on an ended session");
            return self.stats.clone();
        }

        info!(
            "ScanSession: Starting with {} callback(s), buffer {}",
            self.callbacks.len(),
            self.config.event_buffer
        );
        self.state = SessionState::Scanning;

        while let Some(event) = self.rx.recv().await {
            self.dispatch(&event);

            match event {
                ScanEvent::Locked(locked) => self.stats.locked = locked,
                ScanEvent::End(true) => {
                    self.stats.ended = true;
                    if self.config.stop_on_end {
                        debug!("ScanSession: End reported, stopping");
                        break;
                    }
                }
                _ => {}
            }
        }

        // Later sends fail instead of filling a queue nobody reads.
        self.rx.close();
        while self.rx.try_recv().is_ok() {
            self.stats.events_discarded += 1;
        }
        if self.stats.events_discarded > 0 {
            warn!(
                "ScanSession: Discarded {} event(s) queued after the end of the scan",
                self.stats.events_discarded
            );
        }
        self.state = SessionState::Ended;

        info!(
            "ScanSession: Ended after {} event(s), {} callback failure(s)",
            self.stats.events_delivered, self.stats.callback_failures
        );
        self.stats.clone()
    }

    fn dispatch(&mut self, event: &ScanEvent) {
        debug!("ScanSession: Delivering '{}'", event.kind());

        for (index, callback) in self.callbacks.iter().enumerate() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| callback.on_event(event)));
            if let Err(payload) = result {
                self.stats.callback_failures += 1;
                error!(
                    "ScanSession: Callback #{} failed on '{}': {}",
                    index,
                    event.kind(),
                    panic_message(payload.as_ref())
                );
            }
        }

        self.stats.events_delivered += 1;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter {
        progress: AtomicUsize,
        ends: AtomicUsize,
    }

    impl ScanCallback for Counter {
        fn on_progress(&self, _percent: u8) {
            self.progress.fetch_add(1, Ordering::SeqCst);
        }

        fn on_end(&self, _is_end: bool) {
            self.ends.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Exploding;

    impl ScanCallback for Exploding {
        fn on_progress(&self, percent: u8) {
            panic!("progress {} rejected", percent);
        }
    }

    #[test]
    fn test_scan_session_config_default() {
        let config = ScanSessionConfig::default();
        assert_eq!(config.event_buffer, 64);
        assert!(config.stop_on_end);
    }

    #[tokio::test]
    async fn test_delivers_to_every_callback() {
        let (mut session, sender) = ScanSession::new(ScanSessionConfig::default());
        let first = Arc::new(Counter::default());
        let second = Arc::new(Counter::default());
        session.add_callback(first.clone());
        session.add_callback(second.clone());
        assert_eq!(session.state(), SessionState::Idle);

        for percent in [0, 50, 100] {
            sender.send(ScanEvent::Progress(percent)).await.unwrap();
        }
        sender.send(ScanEvent::End(true)).await.unwrap();

        let stats = session.run().await;
        assert_eq!(session.state(), SessionState::Ended);
        assert_eq!(stats.events_delivered, 4);
        assert!(stats.ended);
        assert_eq!(first.progress.load(Ordering::SeqCst), 3);
        assert_eq!(second.progress.load(Ordering::SeqCst), 3);
        assert_eq!(second.ends.load(Ordering::SeqCst), 1);
        assert!(sender.is_closed());
    }

    #[tokio::test]
    async fn test_panicking_callback_does_not_stop_scan() {
        let (mut session, sender) = ScanSession::new(ScanSessionConfig::default());
        let counter = Arc::new(Counter::default());
        session.add_callback(Arc::new(Exploding));
        session.add_callback(counter.clone());

        let handle = session.spawn();
        sender.send(ScanEvent::Locked(true)).await.unwrap();
        sender.send(ScanEvent::Progress(10)).await.unwrap();
        sender.send(ScanEvent::Progress(20)).await.unwrap();
        sender.send(ScanEvent::End(true)).await.unwrap();

        let stats = handle.await.unwrap();
        assert_eq!(stats.callback_failures, 2);
        assert_eq!(stats.events_delivered, 4);
        assert!(stats.locked);
        assert_eq!(counter.progress.load(Ordering::SeqCst), 2);
        assert_eq!(counter.ends.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_end_false_keeps_running() {
        let (mut session, sender) = ScanSession::new(ScanSessionConfig::default());
        let counter = Arc::new(Counter::default());
        session.add_callback(counter.clone());

        sender.send(ScanEvent::End(false)).await.unwrap();
        sender.send(ScanEvent::Progress(30)).await.unwrap();
        drop(sender);

        let stats = session.run().await;
        assert!(!stats.ended);
        assert_eq!(stats.events_delivered, 2);
        assert_eq!(counter.progress.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_without_stop_on_end() {
        let config = ScanSessionConfig {
            event_buffer: 8,
            stop_on_end: false,
        };
        let (mut session, sender) = ScanSession::new(config);
        let counter = Arc::new(Counter::default());
        session.add_callback(counter.clone());

        sender.send(ScanEvent::End(true)).await.unwrap();
        sender.send(ScanEvent::Progress(100)).await.unwrap();
        drop(sender);

        let stats = session.run().await;
        assert!(stats.ended);
        assert_eq!(counter.progress.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_send_after_end_returns_event() {
        let (mut session, sender) = ScanSession::new(ScanSessionConfig::default());
        sender.send(ScanEvent::End(true)).await.unwrap();
        session.run().await;

        let rejected = sender.send(ScanEvent::Progress(5)).await;
        assert_eq!(rejected, Err(ScanEvent::Progress(5)));
    }

    #[tokio::test]
    async fn test_events_queued_after_end_are_counted() {
        let (mut session, sender) = ScanSession::new(ScanSessionConfig::default());
        let counter = Arc::new(Counter::default());
        session.add_callback(counter.clone());

        sender.send(ScanEvent::Progress(50)).await.unwrap();
        sender.send(ScanEvent::End(true)).await.unwrap();
        sender.send(ScanEvent::Progress(100)).await.unwrap();
        sender.send(ScanEvent::Locked(false)).await.unwrap();

        let stats = session.run().await;
        assert_eq!(stats.events_delivered, 2);
        assert_eq!(stats.events_discarded, 2);
        assert_eq!(counter.progress.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_blocking_send_from_driver_thread() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let (mut session, sender) = ScanSession::new(ScanSessionConfig::default());
        let counter = Arc::new(Counter::default());
        session.add_callback(counter.clone());

        let driver = std::thread::spawn(move || {
            sender.blocking_send(ScanEvent::Progress(1)).unwrap();
            sender.blocking_send(ScanEvent::End(true)).unwrap();
        });

        let stats = runtime.block_on(session.run());
        driver.join().unwrap();
        assert_eq!(stats.events_delivered, 2);
        assert_eq!(counter.progress.load(Ordering::SeqCst), 1);
    }
}
