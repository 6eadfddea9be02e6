//! Configuration module for environment variable parsing.
//!
//! Raw values are read once at startup by [`Config::from_env`]; key material is
//! decoded and validated separately by [`FormKeys::from_config`].

use std::env;

use ed25519_dalek::VerifyingKey;
use thiserror::Error;
use tracing::warn;

use crate::crypto::{DecryptError, RecipientKey};
use crate::web::signature::{verifying_key_from_base64, DEFAULT_MAX_AGE_MS};

/// FormSG production signing public key.
pub const DEFAULT_FORM_PUBLIC_KEY: &str = "3Tt8VduXsjjd4IrpdCd7BAkdZl/vUCstu9UvTX84FWw=";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("FORM_PUBLIC_KEY is not a valid base64 ed25519 public key")]
    InvalidPublicKey,

    #[error("FORM_SECRET_KEY is invalid: {0}")]
    InvalidSecretKey(#[source] DecryptError),
}

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Base64 ed25519 key the forms platform signs webhooks with
    pub form_public_key: String,

    /// Base64 32-byte secret key of the form
    pub form_secret_key: Option<String>,

    /// URI registered with the forms platform, used in the signed base string
    pub form_post_uri: Option<String>,

    /// Port for the web server to listen on
    pub port: u16,

    /// Directory decrypted submissions and attachments are written to
    pub output_dir: String,

    /// Whether to download and decrypt attachments
    pub has_attachments: bool,

    /// Whether to serve the output directory under /temp/
    pub serve_output: bool,

    /// Attachment download timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Maximum signature age in milliseconds
    pub signature_max_age_ms: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            form_public_key: env::var("FORM_PUBLIC_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FORM_PUBLIC_KEY.to_string()),

            form_secret_key: non_empty("FORM_SECRET_KEY"),

            form_post_uri: non_empty("FORM_POST_URI"),

            port: parse_or("PORT", 8080),

            output_dir: non_empty("OUTPUT_DIR").unwrap_or_else(|| "temp".to_string()),

            has_attachments: parse_bool("HAS_ATTACHMENTS", true),

            serve_output: parse_bool("SERVE_OUTPUT", false),

            request_timeout_ms: parse_or("REQUEST_TIMEOUT_MS", 8000),

            signature_max_age_ms: parse_or("SIGNATURE_MAX_AGE_MS", DEFAULT_MAX_AGE_MS),
        }
    }

    pub fn post_uri(&self) -> Result<&str, ConfigError> {
        self.form_post_uri
            .as_deref()
            .ok_or(ConfigError::Missing("FORM_POST_URI"))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("form_public_key", &self.form_public_key)
            .field("form_secret_key_set", &self.form_secret_key.is_some())
            .field("form_post_uri", &self.form_post_uri)
            .field("port", &self.port)
            .field("output_dir", &self.output_dir)
            .field("has_attachments", &self.has_attachments)
            .field("serve_output", &self.serve_output)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("signature_max_age_ms", &self.signature_max_age_ms)
            .finish()
    }
}

/// Decoded, validated key material. Read-only for the life of the process.
#[derive(Debug)]
pub struct FormKeys {
    pub signing_public_key: VerifyingKey,
    pub recipient: RecipientKey,
}

impl FormKeys {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let signing_public_key = verifying_key_from_base64(&config.form_public_key)
            .ok_or(ConfigError::InvalidPublicKey)?;

        let secret = config
            .form_secret_key
            .as_deref()
            .ok_or(ConfigError::Missing("FORM_SECRET_KEY"))?;
        let recipient = RecipientKey::from_base64(secret).map_err(ConfigError::InvalidSecretKey)?;

        Ok(Self {
            signing_public_key,
            recipient,
        })
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Parse a boolean flag such as "true", "1", "no".
fn parse_bool(name: &str, default: bool) -> bool {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            warn!(env_var = name, value = %raw, "Invalid boolean, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

    use super::*;

    fn config() -> Config {
        Config {
            form_public_key: DEFAULT_FORM_PUBLIC_KEY.to_string(),
            form_secret_key: Some(BASE64.encode([9u8; 32])),
            form_post_uri: Some("https://example.com/submissions".to_string()),
            port: 8080,
            output_dir: "temp".to_string(),
            has_attachments: true,
            serve_output: false,
            request_timeout_ms: 8000,
            signature_max_age_ms: DEFAULT_MAX_AGE_MS,
        }
    }

    #[test]
    fn test_parse_bool() {
        env::set_var("TEST_FORMSG_BOOL", "No");
        assert!(!parse_bool("TEST_FORMSG_BOOL", true));
        env::set_var("TEST_FORMSG_BOOL", "1");
        assert!(parse_bool("TEST_FORMSG_BOOL", false));
        env::set_var("TEST_FORMSG_BOOL", "maybe");
        assert!(parse_bool("TEST_FORMSG_BOOL", true));
        env::remove_var("TEST_FORMSG_BOOL");
        assert!(!parse_bool("TEST_FORMSG_BOOL", false));
    }

    #[test]
    fn test_parse_or() {
        env::set_var("TEST_FORMSG_PORT", " 9090 ");
        assert_eq!(parse_or::<u16>("TEST_FORMSG_PORT", 8080), 9090);
        env::set_var("TEST_FORMSG_PORT", "eighty");
        assert_eq!(parse_or::<u16>("TEST_FORMSG_PORT", 8080), 8080);
        env::remove_var("TEST_FORMSG_PORT");
    }

    #[test]
    fn test_form_keys_from_config() {
        let keys = FormKeys::from_config(&config()).unwrap();
        assert_eq!(
            BASE64.encode(keys.signing_public_key.as_bytes()),
            DEFAULT_FORM_PUBLIC_KEY
        );
    }

    #[test]
    fn test_form_keys_missing_secret() {
        let mut config = config();
        config.form_secret_key = None;
        assert!(matches!(
            FormKeys::from_config(&config),
            Err(ConfigError::Missing("FORM_SECRET_KEY"))
        ));
    }

    #[test]
    fn test_form_keys_short_secret() {
        let mut config = config();
        config.form_secret_key = Some(BASE64.encode([9u8; 24]));
        assert!(matches!(
            FormKeys::from_config(&config),
            Err(ConfigError::InvalidSecretKey(DecryptError::SizeMismatch { actual: 24, .. }))
        ));
    }

    #[test]
    fn test_form_keys_invalid_public_key() {
        let mut config = config();
        config.form_public_key = BASE64.encode([1u8; 16]);
        assert!(matches!(
            FormKeys::from_config(&config),
            Err(ConfigError::InvalidPublicKey)
        ));
    }

    #[test]
    fn test_debug_hides_secret_key() {
        let config = config();
        let debug = format!("{:?}", config);
        assert!(!debug.contains(config.form_secret_key.as_deref().unwrap()));
    }

    #[test]
    fn test_post_uri_required() {
        let mut config = config();
        assert_eq!(config.post_uri().unwrap(), "https://example.com/submissions");
        config.form_post_uri = None;
        assert!(matches!(config.post_uri(), Err(ConfigError::Missing("FORM_POST_URI"))));
    }
}
