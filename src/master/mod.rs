pub mod requests;
pub mod server;
pub mod topology;

pub use server::MasterServer;
pub use topology::{ReducerAssignment, Topology};
