//! Filesystem adapters for the source ports.
//!
//! Modification times serve as change signals.

pub mod document;
pub mod policies;

pub use document::FsDocumentSource;
pub use policies::FsPolicySource;
