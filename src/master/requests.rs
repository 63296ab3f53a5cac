use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::oneshot;

use crate::protocol::message::{MergedResult, RequestId};

/// Dispenses request ids for one master instance. Owned, not global, so two
/// masters in one process (tests) never collide.
#[derive(Debug)]
pub struct RequestIdGenerator {
    next: AtomicU64,
}

impl RequestIdGenerator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> RequestId {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for RequestIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Submitted requests waiting for their reducer's merged reply.
#[derive(Debug)]
pub struct PendingReplies {
    waiting: Mutex<HashMap<RequestId, oneshot::Sender<MergedResult>>>,
}

impl PendingReplies {
    pub fn new() -> Self {
        Self {
            waiting: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&self, request_id: RequestId) -> oneshot::Receiver<MergedResult> {
        let (tx, rx) = oneshot::channel();
        self.waiting.lock().unwrap().insert(request_id, tx);
        rx
    }

    /// Routes a reply to its submitter. False when nobody is waiting (an
    /// unknown or already-completed request id).
    pub fn complete(&self, request_id: RequestId, result: MergedResult) -> bool {
        match self.waiting.lock().unwrap().remove(&request_id) {
            Some(tx) => tx.send(result).is_ok(),
            None => false,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.waiting.lock().unwrap().len()
    }
}

impl Default for PendingReplies {
    fn default() -> Self {
        Self::new()
    }
}
