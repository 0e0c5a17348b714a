//! Bearer token formatting, parsing, and HMAC verifier input.

use std::{fmt, str::FromStr};

use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::domain::users::models::UserUuid;

/// Bearer token identifier prefix.
pub const TOKEN_PREFIX: &str = "vx";

/// Number of secret bytes encoded in a token.
pub const TOKEN_SECRET_BYTES: usize = 32;

const TOKEN_SECRET_HEX_CHARS: usize = TOKEN_SECRET_BYTES * 2;

/// Access tokens live for a day, refresh tokens for a week.
pub const ACCESS_TOKEN_TTL_HOURS: i64 = 24;
pub const REFRESH_TOKEN_TTL_HOURS: i64 = 7 * 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "ACCESS",
            Self::Refresh => "REFRESH",
        }
    }

    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ACCESS" => Some(Self::Access),
            "REFRESH" => Some(Self::Refresh),
            _ => None,
        }
    }
}

impl FromStr for TokenKind {
    type Err = AuthTokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "access" => Ok(Self::Access),
            "refresh" => Ok(Self::Refresh),
            _ => Err(AuthTokenError::UnsupportedKind),
        }
    }
}

/// Server-side HMAC key for token hashes.
#[derive(Clone)]
pub struct TokenKey(String);

impl TokenKey {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenKey(**redacted**)")
    }
}

#[derive(Clone)]
pub struct TokenSecret {
    bytes: [u8; TOKEN_SECRET_BYTES],
}

impl TokenSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; TOKEN_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; TOKEN_SECRET_BYTES] {
        &self.bytes
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSecret(**redacted**)")
    }
}

impl Drop for TokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[derive(Debug, Clone)]
pub struct ParsedAuthToken {
    pub token_uuid: Uuid,
    pub kind: TokenKind,
    pub secret: TokenSecret,
}

#[derive(Debug, Error)]
pub enum AuthTokenError {
    #[error("token format is invalid")]
    InvalidFormat,

    #[error("token uses an unsupported kind")]
    UnsupportedKind,

    #[error("token secret encoding is invalid")]
    InvalidSecretEncoding,

    #[error("token key is unusable")]
    Key,
}

#[must_use]
pub fn generate_token_secret() -> TokenSecret {
    let mut secret = [0_u8; TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut secret);

    TokenSecret::from_bytes(secret)
}

#[must_use]
pub fn format_auth_token(token_uuid: Uuid, kind: TokenKind, secret: &TokenSecret) -> String {
    format!(
        "{TOKEN_PREFIX}_{}_{}.{}",
        kind.segment(),
        token_uuid.simple(),
        encode_hex(secret.as_bytes())
    )
}

pub fn parse_auth_token(token: &str) -> Result<ParsedAuthToken, AuthTokenError> {
    let (prefix_and_id, secret_hex) = token.split_once('.').ok_or(AuthTokenError::InvalidFormat)?;

    let mut id_parts = prefix_and_id.splitn(3, '_');

    let prefix = id_parts.next().ok_or(AuthTokenError::InvalidFormat)?;
    let kind_segment = id_parts.next().ok_or(AuthTokenError::InvalidFormat)?;
    let token_uuid_segment = id_parts.next().ok_or(AuthTokenError::InvalidFormat)?;

    if prefix != TOKEN_PREFIX {
        return Err(AuthTokenError::InvalidFormat);
    }

    let kind = TokenKind::from_str(kind_segment)?;

    let token_uuid =
        Uuid::try_parse(token_uuid_segment).map_err(|_| AuthTokenError::InvalidFormat)?;

    let secret = decode_secret_hex(secret_hex).ok_or(AuthTokenError::InvalidSecretEncoding)?;

    Ok(ParsedAuthToken {
        token_uuid,
        kind,
        secret: TokenSecret::from_bytes(secret),
    })
}

/// Build the canonical HMAC input for a token.
///
/// Format: `{token_uuid_hex}:{kind}:{user_uuid_hex}:{secret_hex}`
#[must_use]
pub fn build_verifier_input(
    token_uuid: &Uuid,
    kind: TokenKind,
    user_uuid: UserUuid,
    secret: &TokenSecret,
) -> Vec<u8> {
    let input = format!(
        "{}:{}:{}:{}",
        token_uuid.simple(),
        kind.as_str(),
        user_uuid.into_uuid().simple(),
        encode_hex(secret.as_bytes()),
    );

    input.into_bytes()
}

/// HMAC-SHA256 the verifier input with the server key, hex-encoded.
pub fn hash_verifier_input(key: &TokenKey, input: &[u8]) -> Result<String, AuthTokenError> {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(key.as_bytes()).map_err(|_| AuthTokenError::Key)?;

    mac.update(input);

    let digest = mac.finalize().into_bytes();

    Ok(encode_hex(&digest))
}

pub(crate) fn encode_hex(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";

    let mut encoded = String::with_capacity(bytes.len() * 2);

    for byte in bytes {
        encoded.push(HEX[(byte >> 4) as usize] as char);
        encoded.push(HEX[(byte & 0x0f) as usize] as char);
    }

    encoded
}

fn decode_secret_hex(secret_hex: &str) -> Option<[u8; TOKEN_SECRET_BYTES]> {
    if secret_hex.len() != TOKEN_SECRET_HEX_CHARS {
        return None;
    }

    let mut secret = [0_u8; TOKEN_SECRET_BYTES];
    let secret_bytes = secret_hex.as_bytes();

    for (index, byte) in secret.iter_mut().enumerate() {
        let hi = decode_hex_nibble(secret_bytes[index * 2])?;
        let lo = decode_hex_nibble(secret_bytes[(index * 2) + 1])?;

        *byte = (hi << 4) | lo;
    }

    Some(secret)
}

fn decode_hex_nibble(value: u8) -> Option<u8> {
    match value {
        b'0'..=b'9' => Some(value - b'0'),
        b'a'..=b'f' => Some(value - b'a' + 10),
        b'A'..=b'F' => Some(value - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format_round_trip() {
        let token_uuid = Uuid::nil();
        let secret = TokenSecret::from_bytes([0xAB; TOKEN_SECRET_BYTES]);
        let token = format_auth_token(token_uuid, TokenKind::Refresh, &secret);
        let parsed = parse_auth_token(&token).expect("token should parse");

        assert_eq!(parsed.token_uuid, token_uuid);
        assert_eq!(parsed.kind, TokenKind::Refresh);
        assert_eq!(parsed.secret.as_bytes(), secret.as_bytes());
    }

    #[test]
    fn parse_rejects_invalid_prefix() {
        assert!(parse_auth_token("nope_access_00000000000000000000000000000000.aa").is_err());
    }

    #[test]
    fn parse_rejects_unknown_kind() {
        let secret_hex = "ab".repeat(TOKEN_SECRET_BYTES);

        assert!(matches!(
            parse_auth_token(&format!(
                "vx_session_00000000000000000000000000000000.{secret_hex}"
            )),
            Err(AuthTokenError::UnsupportedKind)
        ));
    }

    #[test]
    fn verifier_hash_is_deterministic() {
        let key = TokenKey::new("test-key");
        let secret = TokenSecret::from_bytes([0xCD; TOKEN_SECRET_BYTES]);
        let input =
            build_verifier_input(&Uuid::nil(), TokenKind::Access, UserUuid::new(), &secret);

        let hash1 = hash_verifier_input(&key, &input).expect("hash should compute");
        let hash2 = hash_verifier_input(&key, &input).expect("hash should compute");

        assert_eq!(hash1, hash2, "verifier hash must be deterministic");
        assert_eq!(hash1.len(), 64, "SHA-256 hex digest length");
    }
}
