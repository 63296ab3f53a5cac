pub mod domain;
pub mod logging;
pub mod master;
pub mod protocol;
pub mod reducer;
pub mod shared;
pub mod worker;
