use shopgrid::logging;
use shopgrid::reducer::node::Reducer;
use shopgrid::shared::config::CONFIG;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;

    let cfg = &CONFIG.reducer;
    let worker_socket = TcpListener::bind(&cfg.worker_listen_addr).await?;
    info!(
        master_addr = %cfg.master_addr,
        worker_listen_addr = %cfg.worker_listen_addr,
        "Reducer starting"
    );

    Reducer::run(cfg.master_addr.clone(), worker_socket).await
}
