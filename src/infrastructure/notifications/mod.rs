mod noop_gateway;
mod webhook_gateway;

pub use noop_gateway::NoOpNotificationGateway;
pub use webhook_gateway::WebhookNotificationGateway;
