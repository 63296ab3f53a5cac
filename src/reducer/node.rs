use std::collections::HashMap;
use std::sync::Arc;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::protocol::frame::{read_frame, write_frame};
use crate::protocol::message::{
    MasterFrame, MergedResult, Operation, ReducerFrame, RequestId, WorkerFrame, WorkerRef,
};
use crate::reducer::errors::CoordinationError;
use crate::reducer::listener::ReplicationListener;
use crate::reducer::merge::merge;
use crate::reducer::pending::PendingRequest;

const LOG_TARGET: &str = "reducer::node";

/// One reducer process: a set of replication listeners plus the shared,
/// write-locked master connection.
pub struct Reducer {
    id: u32,
    listeners: HashMap<u32, Arc<ReplicationListener>>,
    master_writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl Reducer {
    /// Connects to the master, runs the startup handshake and worker
    /// registration, then serves instructions until the master connection
    /// closes. The worker-facing socket is bound by the caller so tests can
    /// use an ephemeral port.
    pub async fn run(master_addr: String, worker_socket: TcpListener) -> anyhow::Result<()> {
        let stream = TcpStream::connect(&master_addr).await?;
        info!(target: LOG_TARGET, master_addr, "Connected to master");
        let (mut master_rx, master_tx) = stream.into_split();

        let (reducer_id, worker_count) = match read_frame::<_, MasterFrame>(&mut master_rx).await? {
            MasterFrame::Hello {
                reducer_id,
                worker_count,
            } => (reducer_id, worker_count),
            other => anyhow::bail!("expected Hello handshake, got {other:?}"),
        };
        info!(target: LOG_TARGET, reducer_id, worker_count, "Identity assigned");

        let listeners =
            accept_workers(&mut master_rx, &worker_socket, worker_count as usize).await?;

        let reducer = Arc::new(Reducer {
            id: reducer_id,
            listeners,
            master_writer: Arc::new(Mutex::new(master_tx)),
        });
        reducer.serve(master_rx).await;
        Ok(())
    }

    /// Steady state: sole reader of the master connection; every
    /// instruction gets its own task so requests overlap freely.
    async fn serve(self: Arc<Self>, mut master_rx: OwnedReadHalf) {
        loop {
            let frame = match read_frame::<_, MasterFrame>(&mut master_rx).await {
                Ok(frame) => frame,
                Err(e) if e.is_disconnect() => {
                    info!(target: LOG_TARGET, reducer_id = self.id, "Master connection closed");
                    break;
                }
                Err(e) => {
                    error!(
                        target: LOG_TARGET,
                        reducer_id = self.id,
                        error = %e,
                        "Undecodable master frame, stopping instruction loop"
                    );
                    break;
                }
            };

            match frame {
                MasterFrame::Instruction {
                    request_id,
                    op,
                    targets,
                } => {
                    debug!(
                        target: LOG_TARGET,
                        request_id,
                        kind = %op.kind(),
                        targets = targets.len(),
                        "Instruction received"
                    );
                    let reducer = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(e) = reducer.handle_instruction(request_id, op, targets).await {
                            error!(
                                target: LOG_TARGET,
                                request_id,
                                error = %e,
                                "Instruction handler failed"
                            );
                        }
                    });
                }
                other => {
                    warn!(
                        target: LOG_TARGET,
                        reducer_id = self.id,
                        ?other,
                        "Unexpected frame in steady state, ignoring"
                    );
                }
            }
        }
    }

    async fn handle_instruction(
        &self,
        request_id: RequestId,
        op: Operation,
        targets: Vec<WorkerRef>,
    ) -> Result<(), CoordinationError> {
        let pending = PendingRequest::prepare(request_id, &targets, &self.listeners)?;
        debug!(
            target: LOG_TARGET,
            request_id,
            monitors = pending.len(),
            "Waiting for partial results"
        );

        let partials = pending.resolve_all().await;
        let result = merge(op.kind(), partials)?;
        debug!(target: LOG_TARGET, request_id, "Merged, replying to master");

        self.reply(request_id, result).await
    }

    /// One whole frame per lock hold, so concurrently completing handlers
    /// never interleave bytes on the master connection.
    async fn reply(
        &self,
        request_id: RequestId,
        result: MergedResult,
    ) -> Result<(), CoordinationError> {
        let mut writer = self.master_writer.lock().await;
        write_frame(
            &mut *writer,
            &ReducerFrame::Merged {
                reducer_id: self.id,
                request_id,
                result,
            },
        )
        .await?;
        Ok(())
    }
}

/// Accepts one worker connection per AddWorkerConnection marker until the
/// master signals EndOfWorkers. Markers beyond the announced count are
/// ignored; the marker stream is always drained up to EndOfWorkers so the
/// steady-state loop starts aligned.
async fn accept_workers(
    master_rx: &mut OwnedReadHalf,
    socket: &TcpListener,
    expected: usize,
) -> anyhow::Result<HashMap<u32, Arc<ReplicationListener>>> {
    let mut listeners = HashMap::new();

    loop {
        match read_frame::<_, MasterFrame>(master_rx).await? {
            MasterFrame::AddWorkerConnection => {
                if listeners.len() >= expected {
                    warn!(
                        target: LOG_TARGET,
                        expected,
                        "Worker registration beyond expected count, ignoring"
                    );
                    continue;
                }
                let (stream, peer) = socket.accept().await?;
                let (mut worker_rx, _worker_tx) = stream.into_split();

                let worker_id = match read_frame::<_, WorkerFrame>(&mut worker_rx).await? {
                    WorkerFrame::Announce { worker_id } => worker_id,
                    other => anyhow::bail!("expected worker announce, got {other:?}"),
                };
                info!(target: LOG_TARGET, worker_id, %peer, "Worker connected");

                listeners.insert(worker_id, ReplicationListener::spawn(worker_id, worker_rx));
            }
            MasterFrame::EndOfWorkers => break,
            other => anyhow::bail!("unexpected frame during worker registration: {other:?}"),
        }
    }

    info!(
        target: LOG_TARGET,
        registered = listeners.len(),
        expected,
        "Worker registration complete"
    );
    Ok(listeners)
}
