use super::*;
use crate::test_helpers::{self, MockApi};

fn pin_exchange() -> (PinExchange, Arc<MockApi>) {
    let (_tokens, api, _user) = test_helpers::member_backend();
    (PinExchange::new(api.clone()), api)
}

#[tokio::test]
async fn pin_exchange_returns_token_for_valid_pair() {
    let (exchange, api) = pin_exchange();
    let resp = exchange.exchange("9876543210", "1234").await.unwrap();
    assert_eq!(resp.access_token(), "token-9876543210");
    assert!(matches!(resp, ExchangeResponse::Pin(ref auth) if auth.identifier == "9876543210"));
    assert_eq!(api.calls(), vec![crate::net::api::VERIFY_PIN]);
}

#[tokio::test]
async fn pin_exchange_rejects_wrong_pin_with_server_message() {
    let (exchange, _api) = pin_exchange();
    let err = exchange.exchange("9876543210", "9999").await.unwrap_err();
    assert_eq!(err, ClientError::Unauthorized(test_helpers::INVALID_CREDENTIALS.into()));
}

#[tokio::test]
async fn pin_exchange_validates_before_network() {
    let (exchange, api) = pin_exchange();
    let err = exchange.exchange("9876543210", "12").await.unwrap_err();
    assert_eq!(err, ClientError::Validation(validate::PIN_LENGTH_MESSAGE.into()));
    let err = exchange.exchange("   ", "1234").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn pin_exchange_revoke_is_noop() {
    let (exchange, api) = pin_exchange();
    exchange.revoke("anything").await.unwrap();
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn password_exchange_validates_email_and_password_locally() {
    let baas = BaasConfig { url: "http://127.0.0.1:9".into(), anon_key: "anon".into(), bucket: "b".into() };
    let timeouts = Timeouts { request_secs: 1, connect_secs: 1 };
    let exchange = PasswordExchange::new(baas, timeouts).unwrap();

    let err = exchange.exchange("not-an-email", "secret").await.unwrap_err();
    assert_eq!(err, ClientError::Validation(EMAIL_REQUIRED_MESSAGE.into()));
    let err = exchange.exchange("a@b.org", "").await.unwrap_err();
    assert_eq!(err, ClientError::Validation(PASSWORD_REQUIRED_MESSAGE.into()));
}

#[test]
fn parse_grant_reads_hosted_auth_payload() {
    let body = r#"{
        "access_token": "jwt",
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "r",
        "user": {"id": "550e8400-e29b-41d4-a716-446655440000", "email": "a@b.org", "aud": "authenticated"}
    }"#;
    let grant = parse_grant(body).unwrap();
    assert_eq!(grant.access_token, "jwt");
    assert_eq!(grant.expires_in, Some(3600));
    assert_eq!(grant.user.email.as_deref(), Some("a@b.org"));
    assert_eq!(ExchangeResponse::Password(grant).access_token(), "jwt");
}

#[test]
fn parse_grant_without_user_is_malformed() {
    let err = parse_grant(r#"{"access_token": "jwt"}"#).unwrap_err();
    assert!(matches!(err, ClientError::Malformed(_)));
}

#[test]
fn from_config_password_without_baas_is_config_error() {
    let (_tokens, api, _user) = test_helpers::member_backend();
    let mut config = crate::config::ClientConfig::for_api("http://127.0.0.1:9");
    assert!(from_config(&config, api.clone()).is_ok());

    config.auth_variant = AuthVariant::Password;
    assert!(matches!(from_config(&config, api), Err(ClientError::Config(_))));
}
