pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod snapshot;

pub use entities::{Dataset, ImportSummary};
pub use errors::{BackupError, SnapshotViolation};
pub use ports::DatasetRepository;
pub use services::BackupService;
pub use snapshot::{SNAPSHOT_FORMAT_VERSION, SnapshotDocument};
