use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::protocol::frame::{read_frame, write_frame};
use crate::protocol::message::{WorkerFrame, WorkerInstruction};
use crate::worker::shard::CatalogShard;

const LOG_TARGET: &str = "worker::node";

/// Wires one catalog shard into the cluster: announce on the replication
/// connection to the reducer, then execute instructions read from the
/// master connection, pushing each partial result back to the reducer.
///
/// Every instruction runs in its own task; the replication write half is
/// mutex-guarded so concurrent completions send whole frames.
pub async fn run(
    worker_id: u32,
    master_addr: String,
    reducer_addr: String,
    shard: CatalogShard,
) -> anyhow::Result<()> {
    let reducer_stream = TcpStream::connect(&reducer_addr).await?;
    let (_reducer_rx, mut reducer_tx) = reducer_stream.into_split();
    write_frame(&mut reducer_tx, &WorkerFrame::Announce { worker_id }).await?;
    info!(target: LOG_TARGET, worker_id, reducer_addr, "Announced to reducer");
    let reducer_writer = Arc::new(Mutex::new(reducer_tx));

    let master_stream = TcpStream::connect(&master_addr).await?;
    let (mut master_rx, mut master_tx) = master_stream.into_split();
    write_frame(&mut master_tx, &WorkerFrame::Announce { worker_id }).await?;
    info!(target: LOG_TARGET, worker_id, master_addr, "Announced to master");

    let shard = Arc::new(shard);
    loop {
        match read_frame::<_, WorkerInstruction>(&mut master_rx).await {
            Ok(WorkerInstruction::Execute { request_id, op }) => {
                debug!(
                    target: LOG_TARGET,
                    worker_id,
                    request_id,
                    kind = %op.kind(),
                    "Executing instruction"
                );
                let shard = Arc::clone(&shard);
                let writer = Arc::clone(&reducer_writer);
                tokio::spawn(async move {
                    let result = shard.execute(&op);
                    let mut writer = writer.lock().await;
                    if let Err(e) =
                        write_frame(&mut *writer, &WorkerFrame::Partial { request_id, result })
                            .await
                    {
                        error!(
                            target: LOG_TARGET,
                            worker_id,
                            request_id,
                            error = %e,
                            "Failed to send partial result"
                        );
                    }
                });
            }
            Err(e) if e.is_disconnect() => {
                info!(target: LOG_TARGET, worker_id, "Master connection closed");
                break;
            }
            Err(e) => {
                error!(
                    target: LOG_TARGET,
                    worker_id,
                    error = %e,
                    "Undecodable instruction frame, stopping"
                );
                break;
            }
        }
    }
    Ok(())
}
