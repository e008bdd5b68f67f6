pub mod calculator;
pub mod entities;
pub mod errors;
pub mod numbering;
pub mod ports;
pub mod services;
pub mod status;
pub mod value_objects;

pub use calculator::{InvoiceTotals, LineInput};
pub use entities::{
  Client, ClientDetails, Invoice, InvoiceDraft, InvoiceRevision, LineItem, NewLineItem, Settings,
};
pub use errors::InvoiceError;
pub use ports::{
  ClientRepository, InvoiceRepository, Notification, NotificationGateway, SettingsRepository,
};
pub use services::{
  InvoiceData, InvoiceService, InvoiceServiceConfig, InvoiceServiceDependencies, LineItemData,
  NotificationOutcome, StatusChange,
};
pub use value_objects::{
  ClientName, DisplayStatus, InvoiceNumber, InvoiceStatus, LineItemDescription, Quantity, Rate,
  ValueObjectError, VatPercentage,
};
