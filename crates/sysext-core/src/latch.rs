//! One-shot result latch
//!
//! Bridges a callback-driven producer to a single awaiting consumer. The
//! producer may resolve the latch before or after the consumer starts
//! waiting; a value produced early is buffered until `wait` collects it.
//!
//! - `wait` may be called once per latch. A second call panics.
//! - `resume` delivers the first value it is given. Later calls are ignored.
//!
//! State lives behind a single mutex which is never held across an await.

use std::fmt;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;

enum LatchState<T, E> {
    /// Nothing produced, nobody waiting
    Empty,
    /// A consumer is suspended in `wait`
    Waiting(oneshot::Sender<Result<T, E>>),
    /// A value was produced before anyone waited
    Pending(Result<T, E>),
    /// The value has been handed over
    Spent,
}

/// One-time producer/consumer handoff of a `Result<T, E>`
pub struct ResultLatch<T, E> {
    state: Mutex<LatchState<T, E>>,
}

impl<T, E> ResultLatch<T, E> {
    /// Create an empty latch
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LatchState::Empty),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LatchState<T, E>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Deliver the terminal value
    ///
    /// Returns `true` if this call resolved the latch, `false` if it had
    /// already been resolved and the value was dropped.
    pub fn resume(&self, value: Result<T, E>) -> bool {
        let mut state = self.lock();
        match std::mem::replace(&mut *state, LatchState::Spent) {
            LatchState::Empty => {
                *state = LatchState::Pending(value);
                true
            }
            LatchState::Waiting(tx) => {
                drop(state);
                // A dropped receiver means the waiter was cancelled; nothing left to wake
                let _ = tx.send(value);
                true
            }
            previous => {
                *state = previous;
                tracing::debug!("result latch already resolved, ignoring duplicate resume");
                false
            }
        }
    }

    /// Whether a value has been produced
    pub fn is_resolved(&self) -> bool {
        matches!(*self.lock(), LatchState::Pending(_) | LatchState::Spent)
    }

    /// Suspend until a value is available, then return it
    ///
    /// # Panics
    ///
    /// Panics if called more than once on the same latch.
    pub async fn wait(&self) -> Result<T, E> {
        let rx = {
            let mut state = self.lock();
            match std::mem::replace(&mut *state, LatchState::Spent) {
                LatchState::Pending(value) => return value,
                LatchState::Empty => {
                    let (tx, rx) = oneshot::channel();
                    *state = LatchState::Waiting(tx);
                    rx
                }
                previous => {
                    *state = previous;
                    drop(state);
                    panic!("ResultLatch::wait called on a latch that is already spent");
                }
            }
        };

        match rx.await {
            Ok(value) => value,
            Err(_) => panic!("ResultLatch dropped its waiter without delivering a value"),
        }
    }
}

impl<T, E> Default for ResultLatch<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for ResultLatch<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match *self.lock() {
            LatchState::Empty => "empty",
            LatchState::Waiting(_) => "waiting",
            LatchState::Pending(_) => "pending",
            LatchState::Spent => "spent",
        };
        f.debug_struct("ResultLatch").field("state", &state).finish()
    }
}
