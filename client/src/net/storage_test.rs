use super::*;
use crate::state::token::MemoryTokenStore;

fn baas() -> BaasConfig {
    BaasConfig { url: "http://127.0.0.1:9".into(), anon_key: "anon".into(), bucket: "member-uploads".into() }
}

fn client() -> StorageClient {
    StorageClient::new(baas(), Timeouts { request_secs: 1, connect_secs: 1 }).unwrap()
}

#[test]
fn from_config_requires_storage_service() {
    let config = ClientConfig::for_api("http://127.0.0.1:8000");
    let err = StorageClient::from_config(&config, Arc::new(MemoryTokenStore::new())).err();
    assert_eq!(err, Some(ClientError::Config(STORAGE_NOT_CONFIGURED.into())));
}

#[test]
fn only_password_variant_forwards_user_token() {
    let tokens: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::with_token("api-jwt"));
    let mut config = ClientConfig::for_api("http://127.0.0.1:8000");
    config.baas = Some(baas());

    let pin = StorageClient::from_config(&config, tokens.clone()).unwrap();
    assert!(pin.user_tokens.is_none());

    config.auth_variant = AuthVariant::Password;
    let password = StorageClient::from_config(&config, tokens).unwrap();
    assert!(password.user_tokens.is_some());
}

#[test]
fn urls_follow_storage_layout() {
    let c = client();
    assert_eq!(c.default_bucket(), "member-uploads");
    assert_eq!(c.object_url("receipts", "u/a.png"), "http://127.0.0.1:9/storage/v1/object/receipts/u/a.png");
    assert_eq!(c.public_url("receipts", "u/a.png"), "http://127.0.0.1:9/storage/v1/object/public/receipts/u/a.png");
}

#[tokio::test]
async fn empty_file_is_rejected_before_network() {
    let c = client();
    let mut upload = Upload::default();
    assert_eq!(upload.state(), &UploadState::Idle);

    let err = upload.run(&c, "b", "p.png", Vec::new(), "image/png").await.unwrap_err();
    assert_eq!(err, ClientError::Validation("File is empty".into()));
    assert_eq!(upload.state(), &UploadState::Failed("File is empty".into()));
}

#[tokio::test]
async fn unreachable_storage_fails_with_fallback() {
    let c = client();
    let mut upload = Upload::default();
    let err = upload.run(&c, "b", "p.png", vec![1, 2, 3], "image/png").await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
    assert_eq!(upload.state(), &UploadState::Failed(UPLOAD_FALLBACK.into()));
}

#[test]
fn object_path_sanitizes_name() {
    let user = Uuid::nil();
    let path = object_path(user, "my receipt (1).PNG");
    assert!(path.starts_with("00000000-0000-0000-0000-000000000000/"));
    assert!(path.ends_with("-my-receipt--1-.PNG"));
    assert!(object_path(user, "???").ends_with("-file"));
}

#[test]
fn content_type_by_extension() {
    assert_eq!(content_type_for("a.JPG"), "image/jpeg");
    assert_eq!(content_type_for("scan.pdf"), "application/pdf");
    assert_eq!(content_type_for("noext"), "application/octet-stream");
}
