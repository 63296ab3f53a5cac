pub mod errors;
pub mod frame;
pub mod message;

pub use errors::WireError;
pub use frame::{read_frame, write_frame};
