use std::{
    cell::RefCell,
    fmt,
    rc::Rc,
    sync::{
        Arc, Mutex, Weak,
        atomic::{AtomicU64, Ordering},
        mpsc::{RecvTimeoutError, sync_channel},
    },
    thread::{self, JoinHandle, ThreadId},
    time::Duration,
};

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use super::{HandoffError, MediaSession};

type Job = Box<dyn FnOnce(&dyn MediaSession) + Send>;

enum HostCommand {
    Run(Job),
    Shutdown,
}

static NEXT_HOST_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static HOME_SESSION: RefCell<Option<Rc<dyn MediaSession>>> = const { RefCell::new(None) };
}

struct Inner {
    id: u64,
    commands: mpsc::UnboundedSender<HostCommand>,
    home_thread: ThreadId,
    timeout: Duration,
    thread: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to a session living on its own home thread.
///
/// Every read or write is a job sent to the home thread; the caller blocks
/// until the job's result comes back, bounded by the hand-off timeout.
/// Calls made from the home thread itself run inline, so session listeners
/// can query the session without deadlocking.
#[derive(Clone)]
pub struct SessionHost {
    inner: Arc<Inner>,
}

/// Non-owning reference to a [`SessionHost`].
///
/// Held by listeners registered on the session so the session does not keep
/// its own home thread alive.
#[derive(Clone)]
pub struct WeakSessionHost {
    inner: Weak<Inner>,
}

impl SessionHost {
    /// Start a home thread and build the session on it.
    ///
    /// The session is created by `factory` on the new thread and never leaves
    /// it.
    ///
    /// # Errors
    /// Returns `HandoffError::SpawnFailed` if the thread cannot be started
    pub fn spawn<S, F>(name: &str, timeout: Duration, factory: F) -> Result<Self, HandoffError>
    where
        S: MediaSession + 'static,
        F: FnOnce() -> S + Send + 'static,
    {
        let (commands, mut command_rx) = mpsc::unbounded_channel::<HostCommand>();
        let id = NEXT_HOST_ID.fetch_add(1, Ordering::Relaxed);
        let thread_name = format!("session-{name}");

        let handle = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                let session: Rc<dyn MediaSession> = Rc::new(factory());
                HOME_SESSION.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&session)));
                debug!(host = id, "Session home thread started");

                while let Some(command) = command_rx.blocking_recv() {
                    match command {
                        HostCommand::Run(job) => job(session.as_ref()),
                        HostCommand::Shutdown => break,
                    }
                }

                HOME_SESSION.with(|slot| slot.borrow_mut().take());
                debug!(host = id, "Session home thread stopped");
            })
            .map_err(|e| HandoffError::SpawnFailed(format!("{thread_name}: {e}")))?;

        let home_thread = handle.thread().id();

        Ok(Self {
            inner: Arc::new(Inner {
                id,
                commands,
                home_thread,
                timeout,
                thread: Mutex::new(Some(handle)),
            }),
        })
    }

    /// Run `f` against the session on its home thread and wait for the result.
    ///
    /// # Errors
    /// Returns `HandoffError::SessionGone` if the home thread has stopped or
    /// dropped the job, and `HandoffError::TimedOut` if it did not answer
    /// within the hand-off timeout
    pub fn call<R, F>(&self, f: F) -> Result<R, HandoffError>
    where
        F: FnOnce(&dyn MediaSession) -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_home_thread() {
            trace!(host = self.inner.id, "Running session job inline");
            let session = HOME_SESSION.with(|slot| slot.borrow().clone());
            return session
                .map(|session| f(session.as_ref()))
                .ok_or(HandoffError::SessionGone);
        }

        let (reply_tx, reply_rx) = sync_channel(1);
        let job: Job = Box::new(move |session| {
            let _ = reply_tx.send(f(session));
        });

        self.inner
            .commands
            .send(HostCommand::Run(job))
            .map_err(|_| HandoffError::SessionGone)?;

        reply_rx
            .recv_timeout(self.inner.timeout)
            .map_err(|e| match e {
                RecvTimeoutError::Timeout => {
                    warn!(host = self.inner.id, "Session job timed out");
                    HandoffError::TimedOut(self.inner.timeout)
                }
                RecvTimeoutError::Disconnected => HandoffError::SessionGone,
            })
    }

    /// Process-unique id of this host.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Whether the home thread is still accepting jobs.
    pub fn is_running(&self) -> bool {
        !self.inner.commands.is_closed()
    }

    /// Whether the calling thread is this session's home thread.
    pub fn is_home_thread(&self) -> bool {
        thread::current().id() == self.inner.home_thread
    }

    /// Stop the home thread.
    ///
    /// Jobs queued behind the shutdown are dropped and their callers fail
    /// fast. Waits for the thread to exit unless called from it.
    pub fn shutdown(&self) {
        let _ = self.inner.commands.send(HostCommand::Shutdown);

        if self.is_home_thread() {
            return;
        }

        let handle = match self.inner.thread.lock() {
            Ok(mut guard) => guard.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!(host = self.inner.id, "Session home thread panicked");
            }
        }
    }

    /// Non-owning reference to this host.
    pub fn downgrade(&self) -> WeakSessionHost {
        WeakSessionHost {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl WeakSessionHost {
    /// The host, if it is still alive.
    pub fn upgrade(&self) -> Option<SessionHost> {
        self.inner.upgrade().map(|inner| SessionHost { inner })
    }
}

impl PartialEq for SessionHost {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SessionHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHost")
            .field("id", &self.inner.id)
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}
