//! Port traits separating domain logic from I/O concerns.

pub mod market_port;
pub mod report_port;
