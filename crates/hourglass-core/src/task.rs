//! Cancellable background loads.
//!
//! Pages and modals start their network loads through `spawn_load`, which
//! runs the future on the tokio runtime and sends its output back over an
//! mpsc channel. Each load is tied to a `LoadHandle`; once the handle is
//! cancelled (or dropped) the result is never delivered, including a result
//! that was already sitting in the channel when the cancel happened.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A finished load travelling back to the UI task.
#[derive(Debug)]
pub struct Loaded<T> {
    value: T,
    token: CancellationToken,
}

impl<T> Loaded<T> {
    /// The result, unless its load was cancelled after it was sent.
    pub fn take(self) -> Option<T> {
        if self.token.is_cancelled() {
            debug!("Discarding result of cancelled load");
            None
        } else {
            Some(self.value)
        }
    }
}

/// Owner of one in-flight load. Dropping it cancels the load.
#[derive(Debug)]
pub struct LoadHandle {
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl LoadHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The task has finished, whether it delivered or not.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Run `load` in the background and deliver its output on `tx`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_load<T, F>(tx: mpsc::Sender<Loaded<T>>, load: F) -> LoadHandle
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let token = CancellationToken::new();
    let child = token.clone();
    let join = tokio::spawn(async move {
        let value = tokio::select! {
            biased;
            _ = child.cancelled() => return,
            value = load => value,
        };
        if child.is_cancelled() {
            return;
        }
        let loaded = Loaded {
            value,
            token: child.clone(),
        };
        tokio::select! {
            biased;
            _ = child.cancelled() => {}
            result = tx.send(loaded) => {
                if result.is_err() {
                    debug!("Load finished after its receiver closed");
                }
            }
        }
    });
    LoadHandle { token, join }
}

/// Loads belonging to one page or modal, cancelled together on teardown.
#[derive(Debug, Default)]
pub struct LoadGroup {
    handles: Vec<LoadHandle>,
}

impl LoadGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: LoadHandle) {
        // Forget finished loads so long-lived pages don't accumulate handles
        self.handles.retain(|h| !h.is_finished());
        self.handles.push(handle);
    }

    pub fn cancel_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.cancel();
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl Drop for LoadGroup {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
