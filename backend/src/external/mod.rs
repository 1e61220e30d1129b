//! External messaging integrations

pub mod twilio;
pub mod whatsapp;

pub use twilio::TwilioNotifier;
pub use whatsapp::WhatsAppWebNotifier;
