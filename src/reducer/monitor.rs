use std::sync::Mutex;
use tokio::sync::Notify;

use crate::protocol::message::PartialResult;
use crate::reducer::errors::CoordinationError;

#[derive(Debug)]
enum MonitorState {
    Unresolved,
    Resolved(PartialResult),
    Taken,
}

/// One-shot bridge between a replication receive loop and the handler task
/// blocked on that worker's answer.
///
/// Resolves exactly once; a second `deliver` is refused rather than
/// overwriting. The stored value survives until `wait` consumes it, so a
/// delivery that lands before anyone waits is not lost.
#[derive(Debug)]
pub struct RequestMonitor {
    state: Mutex<MonitorState>,
    resolved: Notify,
}

impl RequestMonitor {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MonitorState::Unresolved),
            resolved: Notify::new(),
        }
    }

    /// Stores the partial result and wakes the waiter. Called by the
    /// receive loop that read the matching frame.
    pub fn deliver(&self, result: PartialResult) -> Result<(), CoordinationError> {
        {
            let mut state = self.state.lock().unwrap();
            if !matches!(*state, MonitorState::Unresolved) {
                return Err(CoordinationError::DoubleDelivery);
            }
            *state = MonitorState::Resolved(result);
        }
        self.resolved.notify_one();
        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(*self.state.lock().unwrap(), MonitorState::Unresolved)
    }

    /// Blocks until the result is delivered, then returns it. At most one
    /// task may wait on a given monitor.
    pub async fn wait(&self) -> PartialResult {
        loop {
            // The notified future must exist before the state check, or a
            // deliver landing between check and await would be missed.
            let notified = self.resolved.notified();
            if let Some(result) = self.try_take() {
                return result;
            }
            notified.await;
        }
    }

    fn try_take(&self) -> Option<PartialResult> {
        let mut state = self.state.lock().unwrap();
        if matches!(*state, MonitorState::Resolved(_)) {
            match std::mem::replace(&mut *state, MonitorState::Taken) {
                MonitorState::Resolved(result) => Some(result),
                _ => unreachable!(),
            }
        } else {
            None
        }
    }
}

impl Default for RequestMonitor {
    fn default() -> Self {
        Self::new()
    }
}
