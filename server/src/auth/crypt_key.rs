//! Public key loading.
//!
//! Resolves a `PublicKeyConfig` into a `DecodingKey` usable for RS256
//! verification.
//!
//! # Pre-conditions
//! - The `PublicKeyConfig` has been validated.
//!
//! # Post-conditions
//! - A loaded `CryptKey` always holds a parsed RSA public key.
//! - The key file is read exactly once, during `CryptKey::load`.
//!
//! # Invariants
//! - Permissions are only inspected for keys loaded from a file with the
//!   check enabled, and loose permissions only produce a warning.

use std::path::{Path, PathBuf};

use jsonwebtoken::DecodingKey;

use super::{KeyError, PublicKeyConfig};

const PEM_PREFIX: &str = "-----BEGIN";
const FILE_SCHEME: &str = "file://";

/// Permission bits that pass the key file check without a warning.
#[cfg(unix)]
const ALLOWED_KEY_MODES: [u32; 5] = [0o400, 0o440, 0o600, 0o640, 0o660];

/// Where the key material came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Read from a file at this path.
    File(PathBuf),
    /// Given inline as PEM in the configuration.
    Inline,
}

/// A loaded public key.
#[derive(Clone)]
pub struct CryptKey {
    source: KeySource,
    pass_phrase: Option<String>,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for CryptKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptKey")
            .field("source", &self.source)
            .field("has_pass_phrase", &self.pass_phrase.is_some())
            .finish_non_exhaustive()
    }
}

impl CryptKey {
    /// Load the key described by `config`.
    ///
    /// `key_or_path` is inline PEM when it starts with `-----BEGIN`; otherwise
    /// it is a path, optionally prefixed with `file://`.
    ///
    /// # Errors
    /// Returns `KeyError::NotFound` or `KeyError::Io` if the file cannot be
    /// read, and `KeyError::InvalidPem` if the material is not an RSA public key.
    /// Loose file permissions are logged, never rejected.
    pub fn load(config: &PublicKeyConfig) -> Result<Self, KeyError> {
        let key_or_path = config.key_or_path();

        let (source, material) = if key_or_path.starts_with(PEM_PREFIX) {
            (KeySource::Inline, key_or_path.to_string())
        } else {
            let path = PathBuf::from(key_or_path.strip_prefix(FILE_SCHEME).unwrap_or(key_or_path));
            let material = read_key_file(&path, config.key_permissions_check())?;
            (KeySource::File(path), material)
        };

        let decoding_key = DecodingKey::from_rsa_pem(material.as_bytes())
            .map_err(|e| KeyError::InvalidPem(e.to_string()))?;

        tracing::debug!(source = ?source, "loaded public key");

        Ok(Self {
            source,
            pass_phrase: config.pass_phrase().map(str::to_string),
            decoding_key,
        })
    }

    /// Where the key was loaded from.
    #[must_use]
    pub const fn source(&self) -> &KeySource {
        &self.source
    }

    /// The configured pass phrase, passed through unchanged.
    #[must_use]
    pub fn pass_phrase(&self) -> Option<&str> {
        self.pass_phrase.as_deref()
    }

    /// The key used to verify token signatures.
    #[must_use]
    pub const fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

/// Read a key file, reporting loose permissions when requested.
fn read_key_file(path: &Path, key_permissions_check: bool) -> Result<String, KeyError> {
    let material = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;

    if key_permissions_check {
        if let Some(mode) = loose_permissions(path)? {
            tracing::warn!(
                path = %path.display(),
                mode = %format!("{mode:o}"),
                "key file permissions should be 400, 440, 600, 640 or 660"
            );
        }
    }

    Ok(material)
}

fn io_error(path: &Path, source: std::io::Error) -> KeyError {
    if source.kind() == std::io::ErrorKind::NotFound {
        KeyError::NotFound(path.to_path_buf())
    } else {
        KeyError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Returns the file mode if it is not one of `ALLOWED_KEY_MODES`.
#[cfg(unix)]
fn loose_permissions(path: &Path) -> Result<Option<u32>, KeyError> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::metadata(path).map_err(|e| io_error(path, e))?;
    let mode = metadata.permissions().mode() & 0o777;

    Ok((!ALLOWED_KEY_MODES.contains(&mode)).then_some(mode))
}

#[cfg(not(unix))]
fn loose_permissions(_path: &Path) -> Result<Option<u32>, KeyError> {
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ExtendedKey;
    use crate::testing::{PUBLIC_KEY_PEM, write_key_file};

    fn extended(key_or_path: String, key_permissions_check: bool) -> PublicKeyConfig {
        PublicKeyConfig::Extended(ExtendedKey {
            key_or_path,
            pass_phrase: Some("test".to_string()),
            key_permissions_check,
        })
    }

    #[test]
    fn test_load_from_path() {
        let file = write_key_file(PUBLIC_KEY_PEM, 0o600);
        let config = PublicKeyConfig::Path(file.path().display().to_string());

        let key = CryptKey::load(&config).expect("key loads");
        assert_eq!(key.source(), &KeySource::File(file.path().to_path_buf()));
        assert!(key.pass_phrase().is_none());
    }

    #[test]
    fn test_load_from_file_scheme() {
        let file = write_key_file(PUBLIC_KEY_PEM, 0o600);
        let config = PublicKeyConfig::Path(format!("file://{}", file.path().display()));

        let key = CryptKey::load(&config).expect("key loads");
        assert_eq!(key.source(), &KeySource::File(file.path().to_path_buf()));
    }

    #[test]
    fn test_load_inline_pem() {
        let key = CryptKey::load(&extended(PUBLIC_KEY_PEM.to_string(), true)).expect("key loads");
        assert_eq!(key.source(), &KeySource::Inline);
        assert_eq!(key.pass_phrase(), Some("test"));
    }

    #[test]
    fn test_load_missing_file() {
        let config = PublicKeyConfig::Path("/nonexistent/oauth/public.key".to_string());
        let result = CryptKey::load(&config);
        assert!(matches!(result, Err(KeyError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_pem() {
        let file = write_key_file("not a valid pem key", 0o600);
        let config = PublicKeyConfig::Path(file.path().display().to_string());

        let result = CryptKey::load(&config);
        assert!(matches!(result, Err(KeyError::InvalidPem(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_load_world_readable_key_with_check_enabled() {
        let file = write_key_file(PUBLIC_KEY_PEM, 0o644);
        let config = PublicKeyConfig::Path(file.path().display().to_string());

        assert_eq!(
            loose_permissions(file.path()).expect("metadata readable"),
            Some(0o644)
        );
        let key = CryptKey::load(&config).expect("key loads despite loose permissions");
        assert_eq!(key.source(), &KeySource::File(file.path().to_path_buf()));
    }

    #[cfg(unix)]
    #[test]
    fn test_load_skips_permissions_check_when_disabled() {
        let file = write_key_file(PUBLIC_KEY_PEM, 0o644);
        let config = extended(file.path().display().to_string(), false);

        assert!(CryptKey::load(&config).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_load_accepts_allowed_modes() {
        for mode in ALLOWED_KEY_MODES {
            let file = write_key_file(PUBLIC_KEY_PEM, mode);
            let config = PublicKeyConfig::Path(file.path().display().to_string());
            assert_eq!(loose_permissions(file.path()).expect("metadata readable"), None);
            assert!(CryptKey::load(&config).is_ok(), "mode {mode:o} should be accepted");
        }
    }
}
