//! Cancelable single-threaded tasks
//!
//! Reveal timers and particle frame loops run as `spawn_local` tasks on a
//! tokio `LocalSet`. Each one is paired with a [`TaskHandle`] whose `cancel`
//! is idempotent and takes effect before the task's next callback.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use tokio::task::AbortHandle;

/// Cancellation flag shared between a task and its handle.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Finished,
    Cancelled,
}

/// Owner-side handle of a cancelable task.
#[derive(Debug)]
pub struct TaskHandle {
    token: CancelToken,
    finished: Rc<Cell<bool>>,
    abort: AbortHandle,
}

impl TaskHandle {
    /// Stop the task. Canceling a finished or already-canceled task does nothing.
    pub fn cancel(&self) -> bool {
        if self.finished.get() || self.token.is_cancelled() {
            return false;
        }
        self.token.cancelled.set(true);
        self.abort.abort();
        true
    }

    pub fn status(&self) -> TaskStatus {
        if self.token.is_cancelled() {
            TaskStatus::Cancelled
        } else if self.finished.get() {
            TaskStatus::Finished
        } else {
            TaskStatus::Running
        }
    }

    pub fn is_live(&self) -> bool {
        self.status() == TaskStatus::Running
    }
}

/// Spawn `make(token)` on the current `LocalSet`.
///
/// # Panics
///
/// Panics when called outside a tokio `LocalSet`, like `tokio::task::spawn_local`.
pub fn spawn_cancelable<F, Fut>(make: F) -> TaskHandle
where
    F: FnOnce(CancelToken) -> Fut,
    Fut: Future<Output = ()> + 'static,
{
    let token = CancelToken::default();
    let finished = Rc::new(Cell::new(false));

    let future = make(token.clone());
    let done = finished.clone();
    let join = tokio::task::spawn_local(async move {
        future.await;
        done.set(true);
    });

    TaskHandle {
        token,
        finished,
        abort: join.abort_handle(),
    }
}
