use shopgrid::logging;
use shopgrid::master::server::MasterServer;
use shopgrid::master::topology::Topology;
use shopgrid::shared::config::CONFIG;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;

    let cfg = &CONFIG.master;
    let reducer_socket = TcpListener::bind(&cfg.reducer_listen_addr).await?;
    let worker_socket = TcpListener::bind(&cfg.worker_listen_addr).await?;
    info!(
        reducer_listen_addr = %cfg.reducer_listen_addr,
        worker_listen_addr = %cfg.worker_listen_addr,
        "Master listening"
    );

    let topology = Topology {
        reducers: cfg.topology.clone(),
    };
    let server = MasterServer::start(reducer_socket, worker_socket, topology).await?;
    info!("Cluster wired, master ready");

    // Query submission is driven by the client-facing layer on top of
    // `server.submit`; the process itself just stays up.
    tokio::signal::ctrl_c().await?;
    info!(pending = server.pending_requests(), "Master shutting down");
    Ok(())
}
