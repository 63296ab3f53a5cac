use std::collections::HashMap;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::master::requests::{PendingReplies, RequestIdGenerator};
use crate::master::topology::Topology;
use crate::protocol::frame::{read_frame, write_frame};
use crate::protocol::message::{
    MasterFrame, MergedResult, Operation, ReducerFrame, WorkerFrame, WorkerInstruction, WorkerRef,
};

const LOG_TARGET: &str = "master::server";

struct ReducerHandle {
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

/// The coordinating process, as seen by reducers and workers: assigns
/// reducer identities, drives worker registration, issues instructions and
/// collects merged replies. Client-facing routing sits on top of `submit`
/// and is out of scope here.
pub struct MasterServer {
    reducers: HashMap<u32, ReducerHandle>,
    workers: HashMap<u32, Arc<Mutex<OwnedWriteHalf>>>,
    replies: Arc<PendingReplies>,
    ids: RequestIdGenerator,
}

impl MasterServer {
    /// Accepts one reducer connection per topology entry and then all
    /// announced workers, emitting an AddWorkerConnection to the owning
    /// reducer as each worker arrives and EndOfWorkers once every worker is
    /// in place. Returns when the cluster is fully wired.
    pub async fn start(
        reducer_socket: TcpListener,
        worker_socket: TcpListener,
        topology: Topology,
    ) -> anyhow::Result<Arc<Self>> {
        let replies = Arc::new(PendingReplies::new());

        let mut reducers = HashMap::new();
        for assignment in &topology.reducers {
            let (stream, peer) = reducer_socket.accept().await?;
            let (reducer_rx, mut reducer_tx) = stream.into_split();

            write_frame(
                &mut reducer_tx,
                &MasterFrame::Hello {
                    reducer_id: assignment.reducer_id,
                    worker_count: assignment.worker_ids.len() as u32,
                },
            )
            .await?;
            info!(
                target: LOG_TARGET,
                reducer_id = assignment.reducer_id,
                %peer,
                workers = assignment.worker_ids.len(),
                "Reducer connected"
            );

            tokio::spawn(run_reply_loop(
                assignment.reducer_id,
                reducer_rx,
                Arc::clone(&replies),
            ));
            reducers.insert(
                assignment.reducer_id,
                ReducerHandle {
                    writer: Arc::new(Mutex::new(reducer_tx)),
                },
            );
        }

        let mut workers = HashMap::new();
        let expected = topology.worker_count();
        while workers.len() < expected {
            let (stream, peer) = worker_socket.accept().await?;
            let (mut worker_rx, worker_tx) = stream.into_split();

            let worker_id = match read_frame::<_, WorkerFrame>(&mut worker_rx).await? {
                WorkerFrame::Announce { worker_id } => worker_id,
                other => anyhow::bail!("expected worker announce, got {other:?}"),
            };
            let Some(reducer_id) = topology.reducer_of(worker_id) else {
                anyhow::bail!("worker {worker_id} is not in the topology");
            };
            info!(target: LOG_TARGET, worker_id, reducer_id, %peer, "Worker connected");

            // Tell the owning reducer to accept this worker's replication
            // connection.
            let handle = &reducers[&reducer_id];
            let mut writer = handle.writer.lock().await;
            write_frame(&mut *writer, &MasterFrame::AddWorkerConnection).await?;
            drop(writer);

            workers.insert(worker_id, Arc::new(Mutex::new(worker_tx)));
        }

        for (reducer_id, handle) in &reducers {
            let mut writer = handle.writer.lock().await;
            write_frame(&mut *writer, &MasterFrame::EndOfWorkers).await?;
            debug!(target: LOG_TARGET, reducer_id, "Worker registration closed");
        }
        info!(
            target: LOG_TARGET,
            reducers = reducers.len(),
            workers = workers.len(),
            "Cluster wired"
        );

        Ok(Arc::new(Self {
            reducers,
            workers,
            replies,
            ids: RequestIdGenerator::new(),
        }))
    }

    /// Runs one operation across `worker_ids` through `reducer_id` and
    /// blocks until the merged reply arrives. No timeout: a silent worker
    /// blocks the caller indefinitely.
    pub async fn submit(
        &self,
        reducer_id: u32,
        op: Operation,
        worker_ids: &[u32],
    ) -> anyhow::Result<MergedResult> {
        let reducer = self
            .reducers
            .get(&reducer_id)
            .ok_or_else(|| anyhow::anyhow!("unknown reducer {reducer_id}"))?;

        let request_id = self.ids.next_id();
        let targets: Vec<WorkerRef> = worker_ids
            .iter()
            .map(|&worker_id| WorkerRef {
                worker_id,
                listener_id: worker_id,
            })
            .collect();
        let reply = self.replies.register(request_id);
        debug!(
            target: LOG_TARGET,
            request_id,
            reducer_id,
            kind = %op.kind(),
            targets = targets.len(),
            "Submitting request"
        );

        // The reducer hears about the request before any worker does, so
        // its monitors are registered ahead of the partial results.
        {
            let mut writer = reducer.writer.lock().await;
            write_frame(
                &mut *writer,
                &MasterFrame::Instruction {
                    request_id,
                    op: op.clone(),
                    targets,
                },
            )
            .await?;
        }

        for &worker_id in worker_ids {
            let writer = self
                .workers
                .get(&worker_id)
                .ok_or_else(|| anyhow::anyhow!("unknown worker {worker_id}"))?;
            let mut writer = writer.lock().await;
            write_frame(
                &mut *writer,
                &WorkerInstruction::Execute {
                    request_id,
                    op: op.clone(),
                },
            )
            .await?;
        }

        let result = reply.await?;
        Ok(result)
    }

    pub fn pending_requests(&self) -> usize {
        self.replies.pending_count()
    }
}

async fn run_reply_loop(reducer_id: u32, mut reader: OwnedReadHalf, replies: Arc<PendingReplies>) {
    loop {
        match read_frame::<_, ReducerFrame>(&mut reader).await {
            Ok(ReducerFrame::Merged {
                reducer_id: replying,
                request_id,
                result,
            }) => {
                debug!(
                    target: LOG_TARGET,
                    reducer_id = replying,
                    request_id,
                    "Merged reply received"
                );
                if !replies.complete(request_id, result) {
                    warn!(
                        target: LOG_TARGET,
                        reducer_id,
                        request_id,
                        "Reply for unknown request dropped"
                    );
                }
            }
            Err(e) if e.is_disconnect() => {
                info!(target: LOG_TARGET, reducer_id, "Reducer connection closed");
                break;
            }
            Err(e) => {
                error!(
                    target: LOG_TARGET,
                    reducer_id,
                    error = %e,
                    "Undecodable reply frame, stopping reply loop"
                );
                break;
            }
        }
    }
}
