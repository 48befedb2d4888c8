// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Cryptographically secure credential generation.
//!
//! All output lengths are exact: hex and base64 tokens are produced from
//! slightly over-provisioned random bytes and truncated, so an odd hex
//! length drops its final digit.

use crate::constants::limits;
use crate::error::{CredsmithError, Result};
use crate::types::{GuidFormat, PasswordCharset};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use std::time::SystemTime;

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ASCII_PRINTABLE: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*()-_=+[]{}|;:,.<>?/";

/// Generate a password of exactly `length` symbols from `charset`.
pub fn password(length: i32, charset: PasswordCharset) -> Result<String> {
    if !(limits::PASSWORD_MIN..=limits::PASSWORD_MAX).contains(&length) {
        return Err(CredsmithError::InvalidSpec(format!(
            "password length {} outside {}..={}",
            length,
            limits::PASSWORD_MIN,
            limits::PASSWORD_MAX
        )));
    }
    let n = length as usize;

    match charset {
        PasswordCharset::Alphanumeric => from_charset(n, ALPHANUMERIC),
        PasswordCharset::AsciiPrintable => from_charset(n, ASCII_PRINTABLE),
        PasswordCharset::Hex => hex_token(n),
        PasswordCharset::Base64 => base64_token(n),
    }
}

/// Generate a GUID in the requested format.
pub fn guid(format: GuidFormat) -> Result<String> {
    match format {
        GuidFormat::Uuidv4 => uuid_v4(),
        GuidFormat::Uuidv7 => uuid_v7(),
        GuidFormat::ShortUuid => short_uuid(),
    }
}

fn from_charset(n: usize, charset: &[u8]) -> Result<String> {
    let mut out = String::with_capacity(n);
    for _ in 0..n {
        let idx = random_u32()? as usize % charset.len();
        out.push(charset[idx] as char);
    }
    Ok(out)
}

fn hex_token(n: usize) -> Result<String> {
    let bytes = random_bytes((n + 1) / 2)?;
    let mut encoded = hex::encode(bytes);
    encoded.truncate(n);
    Ok(encoded)
}

fn base64_token(n: usize) -> Result<String> {
    let bytes = random_bytes((n * 3 + 3) / 4)?;
    let mut encoded = URL_SAFE_NO_PAD.encode(bytes);
    encoded.truncate(n);
    Ok(encoded)
}

fn uuid_v4() -> Result<String> {
    let mut bytes = [0u8; 16];
    fill(&mut bytes)?;
    Ok(uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .hyphenated()
        .to_string())
}

fn uuid_v7() -> Result<String> {
    let millis = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let mut bytes = [0u8; 10];
    fill(&mut bytes)?;
    Ok(uuid::Builder::from_unix_timestamp_millis(millis, &bytes)
        .into_uuid()
        .hyphenated()
        .to_string())
}

/// An opaque 128-bit token, not a textual UUID encoding; the name is a
/// legacy label.
fn short_uuid() -> Result<String> {
    let mut bytes = [0u8; 16];
    fill(&mut bytes)?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

fn random_bytes(n: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; n];
    fill(&mut buf)?;
    Ok(buf)
}

fn random_u32() -> Result<u32> {
    let mut buf = [0u8; 4];
    fill(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn fill(buf: &mut [u8]) -> Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CredsmithError::RandomSource(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn test_password_exact_length_for_every_charset() {
        for n in [8, 9, 30, 33, 64, 127, 128] {
            for charset in [
                PasswordCharset::Alphanumeric,
                PasswordCharset::AsciiPrintable,
                PasswordCharset::Hex,
                PasswordCharset::Base64,
            ] {
                let value = password(n, charset).unwrap();
                assert_eq!(value.len(), n as usize, "{charset:?} length {n}");
            }
        }
    }

    #[test]
    fn test_password_length_bounds_rejected() {
        for n in [0, 7, 129, -5] {
            let err = password(n, PasswordCharset::Hex).unwrap_err();
            assert!(err.is_terminal(), "length {n} should be terminal");
        }
    }

    #[test]
    fn test_alphanumeric_symbols() {
        let value = password(128, PasswordCharset::Alphanumeric).unwrap();
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_ascii_printable_symbols() {
        let value = password(128, PasswordCharset::AsciiPrintable).unwrap();
        assert!(value
            .chars()
            .all(|c| ASCII_PRINTABLE.contains(&(c as u8))));
    }

    #[test]
    fn test_hex_symbols_lowercase() {
        let value = password(127, PasswordCharset::Hex).unwrap();
        assert!(value
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_base64_symbols_urlsafe_unpadded() {
        let value = password(100, PasswordCharset::Base64).unwrap();
        assert!(value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert!(!value.contains('='));
    }

    #[test]
    fn test_uuidv4_version_and_variant_bits() {
        let value = guid(GuidFormat::Uuidv4).unwrap();
        let parsed = uuid::Uuid::parse_str(&value).unwrap();
        let bytes = parsed.as_bytes();
        assert_eq!(bytes[6] >> 4, 0x4);
        assert_eq!(bytes[8] >> 6, 0b10);
    }

    #[test]
    fn test_uuidv7_version_variant_and_timestamp() {
        let before = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        let value = guid(GuidFormat::Uuidv7).unwrap();
        let after = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;

        let parsed = uuid::Uuid::parse_str(&value).unwrap();
        let bytes = parsed.as_bytes();
        assert_eq!(bytes[6] >> 4, 0x7);
        assert_eq!(bytes[8] >> 6, 0b10);

        let mut millis: u64 = 0;
        for b in &bytes[..6] {
            millis = (millis << 8) | u64::from(*b);
        }
        assert!(millis >= before && millis <= after);
    }

    #[test]
    fn test_short_uuid_is_opaque_22_char_token() {
        let value = guid(GuidFormat::ShortUuid).unwrap();
        // 16 bytes in unpadded base64
        assert_eq!(value.len(), 22);
        assert!(value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_guids_are_distinct() {
        let a = guid(GuidFormat::Uuidv4).unwrap();
        let b = guid(GuidFormat::Uuidv4).unwrap();
        assert_ne!(a, b);
    }
}
