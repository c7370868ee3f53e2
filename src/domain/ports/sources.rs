use std::path::Path;
use std::time::SystemTime;

use crate::domain::errors::ReloadFailure;
use crate::domain::models::Policy;

/// Opaque marker that changes whenever an input changes.
///
/// The filesystem adapters use modification times; an adapter hashing
/// contents would work just as well because signals are only compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModificationSignal(SystemTime);

impl From<SystemTime> for ModificationSignal {
    fn from(at: SystemTime) -> Self {
        Self(at)
    }
}

/// Port for the backing store of policy documents.
pub trait PolicySource: Send + Sync {
    /// Newest modification signal across all policies, `None` if there are none.
    fn latest_signal(&self) -> Result<Option<ModificationSignal>, ReloadFailure>;

    /// Read every policy. Ordering must be deterministic.
    fn load(&self) -> Result<Vec<Policy>, ReloadFailure>;
}

/// Port for the single monitored document.
pub trait DocumentSource: Send + Sync {
    /// Location used in logs and error messages.
    fn path(&self) -> &Path;

    /// Current modification signal; `None` when the document does not exist.
    fn signal(&self) -> Option<ModificationSignal>;

    /// Read the full document text.
    fn read(&self) -> std::io::Result<String>;
}
