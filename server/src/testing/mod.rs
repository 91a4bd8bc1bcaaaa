//! Shared fixtures for unit tests.

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, get_current_timestamp};
use serde::Serialize;
use tempfile::NamedTempFile;

/// RSA-2048 public key, generated for test purposes only.
pub const PUBLIC_KEY_PEM: &str = include_str!("public.key");

/// Private half of `PUBLIC_KEY_PEM`, used to sign test tokens.
pub const PRIVATE_KEY_PEM: &str = include_str!("private.key");

/// Claims written into test access tokens.
#[derive(Debug, Clone, Serialize)]
pub struct TestClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    pub aud: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub scopes: Vec<String>,
    pub iat: u64,
    pub nbf: u64,
    pub exp: u64,
}

impl TestClaims {
    /// Claims for a token that is valid for the next hour.
    pub fn valid(jti: &str) -> Self {
        let now = get_current_timestamp();
        Self {
            jti: Some(jti.to_string()),
            aud: "client-1".to_string(),
            sub: Some("user-1".to_string()),
            scopes: vec!["read".to_string(), "write".to_string()],
            iat: now,
            nbf: now,
            exp: now + 3600,
        }
    }
}

/// Sign `claims` with `PRIVATE_KEY_PEM` using RS256.
pub fn mint_token(claims: &TestClaims) -> String {
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM.as_bytes()).expect("valid private key");
    encode(&Header::new(Algorithm::RS256), claims, &key).expect("failed to create test token")
}

/// Write `content` to a temporary key file with the given permission bits.
///
/// The file is removed when the returned handle is dropped.
pub fn write_key_file(content: &str, mode: u32) -> NamedTempFile {
    use std::io::Write;

    let mut file = NamedTempFile::new().expect("temp key file");
    file.write_all(content.as_bytes()).expect("write key file");
    file.flush().expect("flush key file");
    set_mode(&file, mode);
    file
}

#[cfg(unix)]
fn set_mode(file: &NamedTempFile, mode: u32) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(mode))
        .expect("set key file permissions");
}

#[cfg(not(unix))]
fn set_mode(_file: &NamedTempFile, _mode: u32) {}
