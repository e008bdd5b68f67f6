pub mod change_invoice_status;
pub mod compute_invoice_totals;
pub mod create_client;
pub mod create_invoice;
pub mod delete_client;
pub mod delete_invoice;
pub mod get_client;
pub mod get_invoice_details;
pub mod list_clients;
pub mod list_invoices;
pub mod mark_invoice_paid;
pub mod next_invoice_number;
pub mod update_client;
pub mod update_invoice;

pub use change_invoice_status::{
  ChangeInvoiceStatusCommand, ChangeInvoiceStatusResponse, ChangeInvoiceStatusUseCase,
};
pub use compute_invoice_totals::{
  ComputeInvoiceTotalsCommand, ComputeInvoiceTotalsResponse, ComputeInvoiceTotalsUseCase,
  TotalsLineInput,
};
pub use create_client::{CreateClientCommand, CreateClientUseCase};
pub use create_invoice::{CreateInvoiceCommand, CreateInvoiceUseCase, InvoiceLineItemInput};
pub use delete_client::{DeleteClientCommand, DeleteClientUseCase};
pub use delete_invoice::{DeleteInvoiceCommand, DeleteInvoiceUseCase};
pub use get_client::{GetClientCommand, GetClientUseCase};
pub use get_invoice_details::{
  GetInvoiceDetailsCommand, GetInvoiceDetailsUseCase, InvoiceDetailsResponse, InvoiceLineItemDto,
};
pub use list_clients::{ClientDto, ListClientsCommand, ListClientsResponse, ListClientsUseCase};
pub use list_invoices::{
  InvoiceListItemDto, ListInvoicesCommand, ListInvoicesResponse, ListInvoicesUseCase,
};
pub use mark_invoice_paid::{
  MarkInvoicePaidCommand, MarkInvoicePaidResponse, MarkInvoicePaidUseCase,
};
pub use next_invoice_number::{
  NextInvoiceNumberCommand, NextInvoiceNumberResponse, NextInvoiceNumberUseCase,
};
pub use update_client::{UpdateClientCommand, UpdateClientUseCase};
pub use update_invoice::{UpdateInvoiceCommand, UpdateInvoiceUseCase};
