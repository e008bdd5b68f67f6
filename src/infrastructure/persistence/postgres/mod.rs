pub mod client_repository;
pub mod dataset_repository;
pub mod invoice_repository;
pub mod settings_repository;

pub use client_repository::PostgresClientRepository;
pub use dataset_repository::PostgresDatasetRepository;
pub use invoice_repository::PostgresInvoiceRepository;
pub use settings_repository::PostgresSettingsRepository;
