//! Tests for the dispatcher adapter

use vmail_core::services::verification::{MailDispatcherTrait, VerificationEmail};
use vmail_shared::config::MailConfig;

use crate::mail::{MailServiceAdapter, MockMailService};

fn email() -> VerificationEmail {
    VerificationEmail {
        address: "bob@example.org".to_string(),
        token: "123456".to_string(),
        verify_url: "http://localhost:8001/verify/123456".to_string(),
        display_name: None,
        application_name: Some("Shop".to_string()),
    }
}

#[tokio::test]
async fn test_adapter_renders_and_delivers() {
    let mock = MockMailService::new();
    let adapter = MailServiceAdapter::new(Box::new(mock.clone()), "Please verify");

    let message_id = adapter.send_verification_email(&email()).await.unwrap();
    assert!(message_id.starts_with("mock_"));

    let delivered = mock.last_message_to("bob@example.org").unwrap();
    assert_eq!(delivered.subject, "Please verify");
    assert!(delivered.text_body.contains("123456"));
    assert!(delivered.text_body.contains("Shop"));
}

#[tokio::test]
async fn test_adapter_reports_failure_as_err() {
    let adapter = MailServiceAdapter::new(Box::new(MockMailService::failing()), "Verify");
    let err = adapter.send_verification_email(&email()).await.unwrap_err();
    assert!(err.contains("Simulated mail sending failure"));
}

#[test]
fn test_adapter_from_config() {
    let adapter = MailServiceAdapter::from_config(&MailConfig::default());
    assert_eq!(adapter.provider_name(), "Mock");
}

#[test]
fn test_only_real_providers_deliver_mail() {
    assert!(!MailServiceAdapter::from_config(&MailConfig::default()).delivers_mail());

    let http = MailConfig {
        provider: "http".to_string(),
        api_url: Some("https://mail.example.net/v3/smtp/email".to_string()),
        api_key: Some("secret".to_string()),
        ..MailConfig::default()
    };
    assert!(MailServiceAdapter::from_config(&http).delivers_mail());
}
