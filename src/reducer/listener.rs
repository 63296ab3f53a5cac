use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncRead;
use tracing::{debug, error, info, warn};

use crate::protocol::frame::read_frame;
use crate::protocol::message::{PartialResult, RequestId, WorkerFrame};
use crate::reducer::monitor::RequestMonitor;

const LOG_TARGET: &str = "reducer::listener";

/// Receive loop for one worker's replication connection.
///
/// Demultiplexes inbound partial results to the monitor registered for the
/// carried request id. Registration (handler task) and delivery (receive
/// loop) both go through the monitor table mutex, and both insert-if-absent:
/// whichever side arrives first creates the monitor the other side finds, so
/// no arrival order can drop a result.
#[derive(Debug)]
pub struct ReplicationListener {
    worker_id: u32,
    monitors: Mutex<HashMap<RequestId, Arc<RequestMonitor>>>,
}

impl ReplicationListener {
    /// Starts the receive loop on `reader` and returns the listener handle.
    pub fn spawn<R>(worker_id: u32, reader: R) -> Arc<Self>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let listener = Arc::new(Self {
            worker_id,
            monitors: Mutex::new(HashMap::new()),
        });

        let loop_handle = Arc::clone(&listener);
        tokio::spawn(async move {
            info!(target: LOG_TARGET, worker_id, "Replication receive loop started");
            loop_handle.run_receive_loop(reader).await;
        });

        listener
    }

    pub fn worker_id(&self) -> u32 {
        self.worker_id
    }

    /// Insert-if-absent: a second registration for the same request returns
    /// the same monitor instance.
    pub fn register_monitor(&self, request_id: RequestId) -> Arc<RequestMonitor> {
        let mut table = self.monitors.lock().unwrap();
        Arc::clone(
            table
                .entry(request_id)
                .or_insert_with(|| Arc::new(RequestMonitor::new())),
        )
    }

    /// Drops the table entry once the awaiting handler has consumed the
    /// result.
    pub fn discard(&self, request_id: RequestId) {
        self.monitors.lock().unwrap().remove(&request_id);
    }

    fn deliver(&self, request_id: RequestId, result: PartialResult) {
        let monitor = {
            let mut table = self.monitors.lock().unwrap();
            Arc::clone(
                table
                    .entry(request_id)
                    .or_insert_with(|| Arc::new(RequestMonitor::new())),
            )
        };

        if let Err(e) = monitor.deliver(result) {
            // Never overwrite a resolved monitor; drop the frame instead.
            error!(
                target: LOG_TARGET,
                worker_id = self.worker_id,
                request_id,
                error = %e,
                "Dropping duplicate partial result"
            );
        }
    }

    async fn run_receive_loop<R>(self: Arc<Self>, mut reader: R)
    where
        R: AsyncRead + Unpin,
    {
        loop {
            match read_frame::<_, WorkerFrame>(&mut reader).await {
                Ok(WorkerFrame::Partial { request_id, result }) => {
                    debug!(
                        target: LOG_TARGET,
                        worker_id = self.worker_id,
                        request_id,
                        "Partial result received"
                    );
                    self.deliver(request_id, result);
                }
                Ok(WorkerFrame::Announce { worker_id }) => {
                    warn!(
                        target: LOG_TARGET,
                        worker_id = self.worker_id,
                        announced = worker_id,
                        "Unexpected announce after handshake, ignoring"
                    );
                }
                Err(e) if e.is_disconnect() => {
                    info!(
                        target: LOG_TARGET,
                        worker_id = self.worker_id,
                        "Worker connection closed"
                    );
                    break;
                }
                Err(e) => {
                    error!(
                        target: LOG_TARGET,
                        worker_id = self.worker_id,
                        error = %e,
                        "Undecodable frame, terminating receive loop"
                    );
                    break;
                }
            }
        }

        // Requests still waiting on this connection stay blocked; there is
        // no failover. Make the count visible at least.
        let unresolved = self
            .monitors
            .lock()
            .unwrap()
            .values()
            .filter(|m| !m.is_resolved())
            .count();
        if unresolved > 0 {
            warn!(
                target: LOG_TARGET,
                worker_id = self.worker_id,
                unresolved,
                "Receive loop exited with unresolved monitors"
            );
        }
    }
}
