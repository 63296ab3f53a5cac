use std::path::PathBuf;

use clap::Parser;
use shopgrid::logging;
use shopgrid::shared::config::CONFIG;
use shopgrid::worker::shard::CatalogShard;
use tracing::info;

#[derive(Parser)]
#[command(name = "shopgrid-worker")]
#[command(about = "Catalog shard worker node", long_about = None)]
struct Args {
    /// Numeric identity announced to the master and the reducer
    #[arg(long)]
    id: u32,

    /// Path to this shard's JSON catalog (defaults to [worker].catalog_path)
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;
    let args = Args::parse();

    let cfg = &CONFIG.worker;
    let catalog_path = args
        .catalog
        .unwrap_or_else(|| PathBuf::from(&cfg.catalog_path));
    let shard = CatalogShard::from_json_file(&catalog_path)?;
    info!(worker_id = args.id, shops = shard.len(), "Worker starting");

    shopgrid::worker::node::run(
        args.id,
        cfg.master_addr.clone(),
        cfg.reducer_addr.clone(),
        shard,
    )
    .await
}
