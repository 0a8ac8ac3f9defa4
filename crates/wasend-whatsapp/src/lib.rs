//! # wasend-whatsapp
//!
//! WhatsApp Cloud API message sender: payload construction, header
//! assembly, the reqwest transport, and credential testing.
//! Docs: <https://developers.facebook.com/docs/whatsapp/cloud-api/reference/messages>

pub mod description;
pub mod headers;
pub mod http;
pub mod payload;
pub mod sender;

pub use credential_test::{test_credentials, CredentialTestResult, CredentialTestStatus};
pub use http::ReqwestClient;
pub use sender::MessageSender;
