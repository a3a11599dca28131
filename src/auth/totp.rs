//! Time-based one-time passwords (RFC 6238, HMAC-SHA1, 6 digits, 30 s step).
//!
//! Secrets are stored and shown base32-encoded (RFC 4648, unpadded), which is
//! what authenticator apps expect in an `otpauth://` URI.

use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;
use subtle::ConstantTimeEq;
use url::Url;

type HmacSha1 = Hmac<Sha1>;

const STEP_SECS: u64 = 30;
const DIGITS: u32 = 6;
const SECRET_BYTES: usize = 20;
/// Accepted clock drift, in steps, either side of now.
const WINDOW: i64 = 1;

/// Decode a stored or typed secret, ignoring padding, spaces and case.
pub fn decode_secret(text: &str) -> Option<Vec<u8>> {
    let normalized: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    BASE32_NOPAD.decode(normalized.as_bytes()).ok()
}

/// A fresh random secret, base32-encoded.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    BASE32_NOPAD.encode(&bytes)
}

fn hotp(key: &[u8], counter: u64) -> Option<u32> {
    let mut mac = HmacSha1::new_from_slice(key).ok()?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = (u32::from(digest[offset] & 0x7f) << 24)
        | (u32::from(digest[offset + 1]) << 16)
        | (u32::from(digest[offset + 2]) << 8)
        | u32::from(digest[offset + 3]);
    Some(binary % 10u32.pow(DIGITS))
}

/// The code for `secret` at unix time `unix_secs`.
pub fn code_at(secret: &str, unix_secs: u64) -> Option<String> {
    let key = decode_secret(secret)?;
    let value = hotp(&key, unix_secs / STEP_SECS)?;
    Some(format!("{value:0width$}", width = DIGITS as usize))
}

/// Verify `candidate` against `secret` at `unix_secs`, allowing one step of
/// drift in either direction.
pub fn verify_at(secret: &str, candidate: &str, unix_secs: u64) -> bool {
    let candidate = candidate.trim();
    if candidate.len() != DIGITS as usize || !candidate.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let Some(key) = decode_secret(secret) else {
        return false;
    };
    let step = (unix_secs / STEP_SECS) as i64;
    (-WINDOW..=WINDOW).any(|delta| {
        let counter = step + delta;
        if counter < 0 {
            return false;
        }
        hotp(&key, counter as u64)
            .map(|v| format!("{v:0width$}", width = DIGITS as usize))
            .is_some_and(|expected| bool::from(expected.as_bytes().ct_eq(candidate.as_bytes())))
    })
}

pub fn verify(secret: &str, candidate: &str) -> bool {
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    verify_at(secret, candidate, now)
}

/// `otpauth://` provisioning URI for authenticator apps.
pub fn provisioning_uri(secret: &str, username: &str, issuer: &str) -> Result<String, url::ParseError> {
    let digits = DIGITS.to_string();
    let period = STEP_SECS.to_string();
    let mut uri = Url::parse_with_params(
        "otpauth://totp/",
        &[
            ("secret", secret),
            ("issuer", issuer),
            ("algorithm", "SHA1"),
            ("digits", digits.as_str()),
            ("period", period.as_str()),
        ],
    )?;
    if let Ok(mut segments) = uri.path_segments_mut() {
        segments.clear().push(&format!("{issuer}:{username}"));
    }
    Ok(uri.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 6238 appendix B seed, SHA1 variant.
    const RFC_SEED: &[u8] = b"12345678901234567890";

    #[test]
    fn rfc6238_vectors() {
        let secret = BASE32_NOPAD.encode(RFC_SEED);
        assert_eq!(code_at(&secret, 59).unwrap(), "287082");
        assert_eq!(code_at(&secret, 1_111_111_109).unwrap(), "081804");
        assert_eq!(code_at(&secret, 1_234_567_890).unwrap(), "005924");
        assert_eq!(code_at(&secret, 2_000_000_000).unwrap(), "279037");
    }

    #[test]
    fn secrets_decode_leniently() {
        assert_eq!(decode_secret("MZXW6YTBOI").unwrap(), b"foobar");
        assert_eq!(decode_secret("mzxw 6ytb oi======").unwrap(), b"foobar");
        assert!(decode_secret("not base32!").is_none());
    }

    #[test]
    fn verify_accepts_one_step_of_drift() {
        let secret = BASE32_NOPAD.encode(RFC_SEED);
        let now = 1_111_111_109;
        let previous = code_at(&secret, now - 30).unwrap();
        let next = code_at(&secret, now + 30).unwrap();
        let far = code_at(&secret, now + 90).unwrap();
        assert!(verify_at(&secret, &previous, now));
        assert!(verify_at(&secret, &next, now));
        assert!(!verify_at(&secret, &far, now));
        assert!(!verify_at(&secret, "12345", now));
        assert!(!verify_at(&secret, "abcdef", now));
    }

    #[test]
    fn generated_secrets_decode_to_twenty_bytes() {
        let secret = generate_secret();
        assert_eq!(decode_secret(&secret).unwrap().len(), SECRET_BYTES);
        assert_ne!(secret, generate_secret());
    }

    #[test]
    fn provisioning_uri_escapes_labels() {
        let uri = provisioning_uri("ABC", "jdoe@example.edu", "Meeting Records - Club").unwrap();
        assert!(uri.starts_with("otpauth://totp/Meeting%20Records%20-%20Club:jdoe@example.edu?"));

        let parsed = Url::parse(&uri).unwrap();
        let query: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        assert!(query.contains(&("secret".into(), "ABC".into())));
        assert!(query.contains(&("issuer".into(), "Meeting Records - Club".into())));
        assert!(query.contains(&("period".into(), "30".into())));
    }
}
