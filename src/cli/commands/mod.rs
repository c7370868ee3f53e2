//! CLI command implementations.

pub mod policies;
pub mod scan;
pub mod status;
pub mod watch;
