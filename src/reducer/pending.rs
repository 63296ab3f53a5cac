use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use crate::protocol::message::{PartialResult, RequestId, WorkerRef};
use crate::reducer::errors::CoordinationError;
use crate::reducer::listener::ReplicationListener;
use crate::reducer::monitor::RequestMonitor;

const LOG_TARGET: &str = "reducer::pending";

/// The outstanding fan-out of one instruction: one monitor per target
/// worker, registered before the workers can possibly answer, consumed
/// exactly once by `resolve_all`.
#[derive(Debug)]
pub struct PendingRequest {
    request_id: RequestId,
    entries: Vec<(WorkerRef, Arc<ReplicationListener>, Arc<RequestMonitor>)>,
}

impl PendingRequest {
    /// Registers a monitor with the owning listener for every target.
    pub fn prepare(
        request_id: RequestId,
        targets: &[WorkerRef],
        listeners: &HashMap<u32, Arc<ReplicationListener>>,
    ) -> Result<Self, CoordinationError> {
        let mut entries = Vec::with_capacity(targets.len());
        for target in targets {
            let listener = listeners
                .get(&target.listener_id)
                .ok_or(CoordinationError::UnknownListener(target.listener_id))?;
            debug!(
                target: LOG_TARGET,
                request_id,
                worker_id = target.worker_id,
                listener_id = target.listener_id,
                "Registering monitor"
            );
            let monitor = listener.register_monitor(request_id);
            entries.push((*target, Arc::clone(listener), monitor));
        }
        Ok(Self {
            request_id,
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Blocks until every monitor resolves, then returns the partials in
    /// arrival order. Merge must not depend on that order.
    pub async fn resolve_all(self) -> Vec<PartialResult> {
        let partials = join_all(
            self.entries
                .iter()
                .map(|(_, _, monitor)| monitor.wait()),
        )
        .await;

        for (_, listener, _) in &self.entries {
            listener.discard(self.request_id);
        }
        debug!(
            target: LOG_TARGET,
            request_id = self.request_id,
            partials = partials.len(),
            "All partial results collected"
        );
        partials
    }
}
