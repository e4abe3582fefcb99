//! Background worker thread with start/stop handshakes.
//!
//! A [`Worker`] runs a [`Work`] implementation on its own thread. The work
//! owns every socket it touches; the outside world only starts and stops it.
//!
//! ```text
//! caller                         worker thread
//!   start() ── spawn ──────────▶ work(control)
//!     │                            open/bind sockets
//!     ◀──────── started(bool) ──── control.started(ok)
//!                                  loop until control.stopped()
//!   stop() ── set flag ─────────▶
//!     ◀──────── finished(bool) ─── control.finished(ok)
//!   join
//! ```
//!
//! Each signal is a one-shot channel: a worker starts at most once in its
//! lifetime. Build a new worker to run the same service again.

use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace, warn};

use socketry_core::error::Result;

use crate::frame::Frame;
use crate::message::Message;
use crate::poller::Poller;
use crate::priority::Priority;
use crate::socket::Socket;

/// Upper bound on how long [`Control::relay`] waits before rechecking the
/// stop flag.
pub const RELAY_POLL_INTERVAL: Duration = Duration::from_millis(100);

const DEFAULT_THREAD_NAME: &str = "socketry-worker";

/// A service loop run on a worker thread.
///
/// Implementations open their sockets inside [`Work::work`], report the
/// outcome with [`Control::started`], then loop until [`Control::stopped`]
/// and report shutdown with [`Control::finished`]. A signal that is never
/// sent is reported as `true` for `finished` and `false` for `started` when
/// `work` returns, and as `false` for both if it panics.
///
/// # Examples
///
/// ```no_run
/// use socketry::prelude::*;
///
/// struct Echo {
///     context: Context,
/// }
///
/// impl Work for Echo {
///     fn work(&mut self, control: &Control) {
///         let options = SocketOptions::new()
///             .with_recv_timeout(std::time::Duration::from_millis(100));
///         let socket = Socket::with_options(&self.context, Role::Replier, &options);
///         let endpoint = Endpoint::parse("tcp://127.0.0.1:9091").unwrap();
///         if !control.started(socket.bind(&endpoint).is_ok()) {
///             return;
///         }
///
///         let mut message = Message::new();
///         while !control.stopped() {
///             if socket.receive(&mut message).is_ok() {
///                 let _ = socket.send(&mut message);
///             }
///         }
///
///         control.finished(true);
///     }
/// }
///
/// let worker = Worker::new(Echo { context: Context::new() });
/// assert!(worker.start());
/// assert!(worker.stop());
/// ```
pub trait Work: Send + 'static {
    /// Run the service. Called once, on the worker thread.
    fn work(&mut self, control: &Control);
}

/// The worker thread's side of the start/stop handshake.
///
/// Also provides the forwarding primitives used to build proxies.
pub struct Control {
    stopped: Arc<AtomicBool>,
    started: Signal,
    finished: Signal,
}

/// A single-use result slot.
struct Signal(Mutex<Option<flume::Sender<bool>>>);

impl Signal {
    fn new(sender: flume::Sender<bool>) -> Self {
        Self(Mutex::new(Some(sender)))
    }

    /// Returns false if the signal was already sent.
    fn send(&self, result: bool) -> bool {
        match self.0.lock().take() {
            Some(sender) => {
                // The receiver is gone only if the worker was dropped.
                let _ = sender.send(result);
                true
            }
            None => false,
        }
    }
}

impl Control {
    /// True once a stop has been requested.
    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Report whether setup succeeded, releasing the caller of
    /// [`Worker::start`]. Returns `result`; only the first report counts.
    pub fn started(&self, result: bool) -> bool {
        if !self.started.send(result) {
            trace!("started already reported");
        }
        result
    }

    /// Report whether shutdown succeeded, releasing the caller of
    /// [`Worker::stop`]. Returns `result`; only the first report counts.
    pub fn finished(&self, result: bool) -> bool {
        if !self.finished.send(result) {
            trace!("finished already reported");
        }
        result
    }

    /// Move one frame from `from` to `to`, preserving its continuation flag.
    ///
    /// Blocks on `from` according to its receive timeout. Returns true only
    /// if both the receive and the send succeed.
    pub fn forward(&self, from: &Socket, to: &Socket) -> bool {
        forward_frame(from, to).is_ok()
    }

    /// Move one complete message from `from` to `to`.
    ///
    /// The whole message is received before any of it is sent, so a failure
    /// never leaves part of it queued on `from`. A message that cannot be
    /// sent is dropped. Returns true only if it was sent.
    pub fn forward_message(&self, from: &Socket, to: &Socket) -> bool {
        transfer(from, to, false).is_ok()
    }

    /// Shuttle messages between `left` and `right` until stopped.
    ///
    /// Each round polls both sockets, then forwards at most one message from
    /// `left` to `right` followed by at most one from `right` to `left`.
    /// Sends never block: a message the destination cannot accept right away
    /// is dropped whole, so a stop is observed within one poll interval.
    ///
    /// Returns `Ok` when a stop was requested, or the error that ended the
    /// relay when the context terminated or either socket became unusable.
    pub fn relay(&self, left: &Socket, right: &Socket) -> Result<()> {
        let mut poller = Poller::new();
        poller.add(left);
        poller.add(right);

        let result = loop {
            if self.stopped() {
                break Ok(());
            }

            let ready = poller.wait(RELAY_POLL_INTERVAL);
            if let Some(error) = poller.failure() {
                break Err(error);
            }

            if ready.contains(&left.id()) {
                if let Err(error) = relay_message(left, right) {
                    break Err(error);
                }
            }

            if ready.contains(&right.id()) {
                if let Err(error) = relay_message(right, left) {
                    break Err(error);
                }
            }
        };

        debug!(
            left = %left.id(),
            right = %right.id(),
            result = ?result,
            "relay stopped"
        );
        result
    }
}

/// Forward one frame; returns its continuation flag.
fn forward_frame(from: &Socket, to: &Socket) -> Result<bool> {
    let mut frame = Frame::new();
    frame.receive(from).map_err(|e| {
        trace!(socket = %from.id(), error = %e, "forward receive failed");
        e
    })?;

    let more = frame.more();
    frame.send(to, !more).map_err(|e| {
        debug!(socket = %to.id(), error = %e, "forward send failed");
        e
    })?;

    Ok(more)
}

/// Receive one whole message from `from` and send it to `to`.
fn transfer(from: &Socket, to: &Socket, nonblocking: bool) -> Result<()> {
    let mut message = Message::new();
    message.receive(from).map_err(|e| {
        trace!(socket = %from.id(), error = %e, "message receive failed");
        e
    })?;

    let frames = message.len();
    let sent = if nonblocking {
        message.send_nonblocking(to)
    } else {
        message.send(to)
    };

    sent.map_err(|e| {
        debug!(socket = %to.id(), frames, error = %e, "message dropped");
        e
    })
}

/// Relay one message; only errors that make either socket unusable end the
/// relay.
fn relay_message(from: &Socket, to: &Socket) -> Result<()> {
    match transfer(from, to, true) {
        Err(e) if e.is_fatal() => Err(e),
        _ => Ok(()),
    }
}

impl Drop for Control {
    fn drop(&mut self) {
        // Only reached with signals outstanding if the work panicked.
        self.started.send(false);
        self.finished.send(false);
    }
}

/// Owns a background thread running a [`Work`].
///
/// `start` and `stop` may be called from any thread. Status queries take
/// the shared side of the lock guarding the thread handle; `start` and
/// `stop` take the exclusive side.
pub struct Worker<W: Work> {
    name: String,
    priority: Priority,
    stopped: Arc<AtomicBool>,
    work: Mutex<Option<W>>,
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    thread: Option<JoinHandle<()>>,
    finished: Option<flume::Receiver<bool>>,
}

impl<W: Work> Worker<W> {
    /// Create an idle worker at normal priority.
    pub fn new(work: W) -> Self {
        Self {
            name: DEFAULT_THREAD_NAME.to_string(),
            priority: Priority::Normal,
            stopped: Arc::new(AtomicBool::new(true)),
            work: Mutex::new(Some(work)),
            state: RwLock::new(State::default()),
        }
    }

    /// Set the priority applied to the thread when it starts.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the thread name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The configured thread priority.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// True unless the worker is running and no stop has been requested.
    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// True while the background thread has not been joined.
    pub fn is_running(&self) -> bool {
        self.state.read().thread.is_some()
    }

    /// Spawn the thread and wait for it to report setup.
    ///
    /// Returns the reported result. Returns false without spawning if the
    /// worker is running or has already been started once. After a failed
    /// setup the thread has been joined and the worker is idle.
    pub fn start(&self) -> bool {
        let mut state = self.state.write();
        if state.thread.is_some() {
            return false;
        }

        let Some(mut work) = self.work.lock().take() else {
            debug!(worker = %self.name, "worker cannot be restarted");
            return false;
        };

        let (started_tx, started_rx) = flume::bounded(1);
        let (finished_tx, finished_rx) = flume::bounded(1);
        let control = Control {
            stopped: Arc::clone(&self.stopped),
            started: Signal::new(started_tx),
            finished: Signal::new(finished_tx),
        };

        self.stopped.store(false, Ordering::Release);
        let priority = self.priority;
        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || {
                priority.apply();
                work.work(&control);
                control.started.send(false);
                control.finished.send(true);
            });

        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                warn!(worker = %self.name, error = %e, "failed to spawn worker thread");
                self.stopped.store(true, Ordering::Release);
                return false;
            }
        };

        state.thread = Some(thread);
        state.finished = Some(finished_rx);

        let result = started_rx.recv().unwrap_or(false);
        if result {
            debug!(worker = %self.name, priority = %priority, "worker started");
        } else {
            debug!(worker = %self.name, "worker setup failed");
            Self::shutdown(&self.stopped, &mut state, &self.name);
        }

        result
    }

    /// Request a stop and wait for the thread to finish. Idempotent.
    ///
    /// Returns the result reported by the work, or true if no thread was
    /// running.
    pub fn stop(&self) -> bool {
        let mut state = self.state.write();
        Self::shutdown(&self.stopped, &mut state, &self.name)
    }

    fn shutdown(stopped: &AtomicBool, state: &mut State, name: &str) -> bool {
        stopped.store(true, Ordering::Release);

        let Some(thread) = state.thread.take() else {
            return true;
        };

        let finished = state
            .finished
            .take()
            .and_then(|rx| rx.recv().ok())
            .unwrap_or(false);

        if thread.join().is_err() {
            warn!(worker = %name, "worker thread panicked");
            return false;
        }

        debug!(worker = %name, result = finished, "worker stopped");
        finished
    }
}

impl<W: Work> Drop for Worker<W> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<W: Work> fmt::Debug for Worker<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("stopped", &self.stopped())
            .field("running", &self.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use socketry_core::endpoint::Endpoint;
    use socketry_core::options::SocketOptions;
    use socketry_core::role::Role;
    use std::sync::atomic::AtomicUsize;

    struct Counting {
        setup: bool,
        rounds: Arc<AtomicUsize>,
    }

    impl Work for Counting {
        fn work(&mut self, control: &Control) {
            if !control.started(self.setup) {
                return;
            }

            while !control.stopped() {
                self.rounds.fetch_add(1, Ordering::Relaxed);
                thread::sleep(Duration::from_millis(1));
            }

            control.finished(true);
        }
    }

    fn counting(setup: bool) -> (Worker<Counting>, Arc<AtomicUsize>) {
        let rounds = Arc::new(AtomicUsize::new(0));
        let work = Counting {
            setup,
            rounds: Arc::clone(&rounds),
        };
        (Worker::new(work), rounds)
    }

    #[test]
    fn test_stop_before_start() {
        let (worker, _) = counting(true);
        assert!(worker.stop());
        assert!(!worker.is_running());
    }

    #[test]
    fn test_start_then_stop_twice() {
        let (worker, rounds) = counting(true);
        assert!(worker.start());
        assert!(worker.is_running());
        assert!(!worker.stopped());

        thread::sleep(Duration::from_millis(20));
        assert!(worker.stop());
        assert!(worker.stop());
        assert!(worker.stopped());
        assert!(!worker.is_running());
        assert!(rounds.load(Ordering::Relaxed) > 0);
    }

    #[test]
    fn test_failed_setup_leaves_worker_idle() {
        let (worker, rounds) = counting(false);
        assert!(!worker.start());
        assert!(!worker.is_running());
        assert!(worker.stopped());
        assert!(worker.stop());
        assert_eq!(rounds.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_start_is_single_use() {
        let (worker, _) = counting(true);
        assert!(worker.start());
        assert!(!worker.start());
        assert!(worker.stop());
        assert!(!worker.start());
    }

    struct Silent;

    impl Work for Silent {
        fn work(&mut self, _control: &Control) {}
    }

    #[test]
    fn test_unreported_start_is_failure() {
        let worker = Worker::new(Silent);
        assert!(!worker.start());
        assert!(worker.stop());
    }

    struct Panicking;

    impl Work for Panicking {
        fn work(&mut self, control: &Control) {
            control.started(true);
            while !control.stopped() {
                thread::sleep(Duration::from_millis(1));
            }
            panic!("work failed during shutdown");
        }
    }

    #[test]
    fn test_panicking_work_stops_false() {
        let worker = Worker::new(Panicking).with_name("panicking");
        assert!(worker.start());
        assert!(!worker.stop());
        assert!(worker.stop());
    }

    /// Forwards one message nowhere, then one to `back`.
    struct ForwardTwice {
        context: Context,
        front: Endpoint,
        back: Endpoint,
        outcome: flume::Sender<bool>,
    }

    impl Work for ForwardTwice {
        fn work(&mut self, control: &Control) {
            let options = SocketOptions::new().with_recv_timeout(Duration::from_secs(5));
            let front = Socket::with_options(&self.context, Role::Pair, &options);
            let back = Socket::with_options(&self.context, Role::Pair, &options);
            let nowhere = Socket::with_options(
                &self.context,
                Role::Dealer,
                &SocketOptions::new().with_send_timeout(Duration::ZERO),
            );

            let bound = front.bind(&self.front).is_ok() && back.bind(&self.back).is_ok();
            if !control.started(bound) {
                return;
            }

            let _ = self.outcome.send(control.forward_message(&front, &nowhere));
            let _ = self.outcome.send(control.forward_message(&front, &back));

            while !control.stopped() {
                thread::sleep(Duration::from_millis(1));
            }
            control.finished(true);
        }
    }

    #[test]
    fn test_forward_message_drops_unsendable_message() {
        let context = Context::new();
        let front = Endpoint::new("inproc", "worker-forward-front", 0);
        let back = Endpoint::new("inproc", "worker-forward-back", 0);
        let (outcome_tx, outcome_rx) = flume::unbounded();
        let worker = Worker::new(ForwardTwice {
            context: context.clone(),
            front: front.clone(),
            back: back.clone(),
            outcome: outcome_tx,
        });
        assert!(worker.start());

        let options = SocketOptions::new().with_recv_timeout(Duration::from_secs(5));
        let client = Socket::with_options(&context, Role::Pair, &options);
        client.connect(&front).unwrap();
        let sink = Socket::with_options(&context, Role::Pair, &options);
        sink.connect(&back).unwrap();

        client
            .send(&mut Message::new().push_str("a").push_str("b").push_str("c"))
            .unwrap();
        client
            .send(&mut Message::new().push_str("d").push_str("e"))
            .unwrap();

        let timeout = Duration::from_secs(5);
        assert!(!outcome_rx.recv_timeout(timeout).unwrap());
        assert!(outcome_rx.recv_timeout(timeout).unwrap());

        // Nothing of the dropped message is left behind.
        let mut received = Message::new();
        sink.receive(&mut received).unwrap();
        assert_eq!(received.len(), 2);
        assert_eq!(received.dequeue_string().as_deref(), Some("d"));
        assert_eq!(received.dequeue_string().as_deref(), Some("e"));

        assert!(worker.stop());
    }

    #[test]
    fn test_stop_from_other_thread() {
        let (worker, _) = counting(true);
        let worker = Arc::new(worker.with_priority(Priority::Low));
        assert!(worker.start());

        let remote = Arc::clone(&worker);
        let stopper = thread::spawn(move || remote.stop());
        assert!(stopper.join().unwrap());
        assert!(!worker.is_running());
    }
}
