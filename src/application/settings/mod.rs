pub mod get_settings;
pub mod test_webhook;
pub mod update_settings;

pub use get_settings::GetSettingsUseCase;
pub use test_webhook::{TestWebhookCommand, TestWebhookResponse, TestWebhookUseCase};
pub use update_settings::{UpdateSettingsCommand, UpdateSettingsUseCase};
