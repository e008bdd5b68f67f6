pub mod export_snapshot;
pub mod import_snapshot;

pub use export_snapshot::{ExportSnapshotCommand, ExportSnapshotResponse, ExportSnapshotUseCase};
pub use import_snapshot::{ImportSnapshotCommand, ImportSnapshotUseCase};
