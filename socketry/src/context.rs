//! Process-wide messaging context.
//!
//! A [`Context`] owns one native context handle. Clones share the handle, so
//! the same context can be handed to every worker thread that opens sockets.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::thread;
use tracing::{debug, trace, warn};

/// Default number of native I/O threads.
pub const DEFAULT_IO_THREADS: i32 = 1;

/// Shared handle to the native messaging context.
///
/// Stopping a context terminates the native context: blocking calls on its
/// sockets fail with `ContextTerminated` on every thread, and sockets opened
/// afterwards are invalid. Termination finishes once every socket created
/// from the context has been closed.
#[derive(Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

struct Inner {
    handle: RwLock<Option<zmq::Context>>,
    threads: i32,
}

impl Context {
    /// Create a started context with one I/O thread.
    pub fn new() -> Self {
        Self::with_threads(DEFAULT_IO_THREADS)
    }

    /// Create a started context with `threads` I/O threads.
    ///
    /// If the thread count is rejected the context is left stopped.
    pub fn with_threads(threads: i32) -> Self {
        let context = Self::stopped(threads);
        context.start();
        context
    }

    /// Create a context that must be started explicitly.
    pub fn stopped(threads: i32) -> Self {
        Self {
            inner: Arc::new(Inner {
                handle: RwLock::new(None),
                threads,
            }),
        }
    }

    /// Create the native context.
    ///
    /// Returns false if the context is already started or the native context
    /// rejects the configured thread count.
    pub fn start(&self) -> bool {
        let mut handle = self.inner.handle.write();
        if handle.is_some() {
            return false;
        }

        let native = zmq::Context::new();
        if let Err(e) = native.set_io_threads(self.inner.threads) {
            debug!(threads = self.inner.threads, error = %e, "context start failed");
            return false;
        }

        trace!(threads = self.inner.threads, "context started");
        *handle = Some(native);
        true
    }

    /// Terminate the native context. Idempotent.
    ///
    /// Does not wait for sockets to close; their owners see
    /// `ContextTerminated` and close them, and termination completes on a
    /// background thread.
    pub fn stop(&self) -> bool {
        let Some(native) = self.inner.handle.write().take() else {
            return true;
        };

        let spawned = thread::Builder::new()
            .name("socketry-context-term".to_string())
            .spawn(move || terminate(native));

        match spawned {
            Ok(_) => trace!("context stopped"),
            // The handle is released; the last socket to close terminates it.
            Err(e) => warn!(error = %e, "failed to spawn context terminator"),
        }
        true
    }

    /// True while the context can open sockets.
    pub fn is_started(&self) -> bool {
        self.inner.handle.read().is_some()
    }

    /// The configured I/O thread count.
    pub fn threads(&self) -> i32 {
        self.inner.threads
    }

    pub(crate) fn handle(&self) -> Option<zmq::Context> {
        self.inner.handle.read().clone()
    }
}

fn terminate(mut native: zmq::Context) {
    loop {
        match native.destroy() {
            Ok(()) => break,
            Err(zmq::Error::EINTR) => continue,
            Err(e) => {
                debug!(error = %e, "context termination failed");
                return;
            }
        }
    }

    trace!("context terminated");
    // Already destroyed; the handle's destructor would terminate it again.
    std::mem::forget(native);
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("threads", &self.inner.threads)
            .field("started", &self.is_started())
            .finish()
    }
}
