pub mod monitor_state;
pub mod scan_orchestrator;

pub use monitor_state::{MonitorState, ScanState, ScanStatus};
pub use scan_orchestrator::{ScanEvent, ScanOrchestrator, ScanOutcome};
