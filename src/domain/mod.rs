pub mod backup;
pub mod invoice;
