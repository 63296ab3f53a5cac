use serde::Deserialize;

use crate::master::topology::ReducerAssignment;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub master: MasterConfig,
    pub reducer: ReducerConfig,
    pub worker: WorkerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct MasterConfig {
    pub reducer_listen_addr: String,
    pub worker_listen_addr: String,
    /// Static assignment of workers to reducers, supplied by deployment.
    pub topology: Vec<ReducerAssignment>,
}

#[derive(Debug, Deserialize)]
pub struct ReducerConfig {
    pub master_addr: String,
    pub worker_listen_addr: String,
}

#[derive(Debug, Deserialize)]
pub struct WorkerConfig {
    pub master_addr: String,
    pub reducer_addr: String,
    pub catalog_path: String,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

use std::env;

pub fn load_settings() -> Result<Settings, config::ConfigError> {
    let config_path = env::var("SHOPGRID_CONFIG").unwrap_or_else(|_| "config".to_string());

    let settings: Settings = config::Config::builder()
        .add_source(config::File::with_name(&config_path))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
