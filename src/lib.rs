pub mod api;
pub mod art;
pub mod executor;
pub mod planner;
pub mod storage;
pub mod types;
pub mod utils;
