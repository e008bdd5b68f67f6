pub mod backup;
pub mod clients;
pub mod health;
pub mod invoices;
pub mod settings;

use chrono::{NaiveDate, Utc};

/// Reference date for derived display status, read from the server clock.
pub(crate) fn today() -> NaiveDate {
  Utc::now().date_naive()
}
