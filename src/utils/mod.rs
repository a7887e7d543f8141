pub mod log;
pub mod mock;
