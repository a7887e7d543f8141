pub mod predicate;
pub mod query;
pub mod scan;
pub mod sequential_scan;
