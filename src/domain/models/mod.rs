pub mod config;
pub mod policy;
pub mod violation;

pub use config::{
    Config, DetectorConfig, DiagnosticsConfig, LoggingConfig, PoliciesConfig, ScanConfig,
    SourceConfig,
};
pub use policy::{Policy, Source};
pub use violation::{
    CandidateViolation, Severity, Violation, ViolationDetails, ViolationFilter, ViolationStatus,
};
