//! TOTP engine - RFC 6238 on top of RFC 4226
//!
//! Everything here is a pure function of (secret, time). Nothing is cached
//! and nothing is stored, so callers may poll as often as they like from
//! any thread.
//!
//! An empty secret means "no TOTP configured". Callers are expected to
//! check for that before asking for a code; see [`crate::Entry::totp_secret`].

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raw bytes in a freshly generated secret (160 bits, 32 base32 chars)
pub const SECRET_BYTES: usize = 20;

/// Default time step in seconds
pub const DEFAULT_INTERVAL: u64 = 30;

/// Default code width
pub const DEFAULT_DIGITS: u32 = 6;

const MAX_DIGITS: u32 = 10;

const BASE32: base32::Alphabet = base32::Alphabet::Rfc4648 { padding: false };

/// TOTP errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TotpError {
    #[error("Invalid TOTP secret: {0}")]
    InvalidSecret(String),

    #[error("TOTP secret is empty")]
    EmptySecret,

    #[error("Invalid TOTP parameters: {0}")]
    InvalidParams(String),
}

/// Time step and code width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotpParams {
    /// Seconds per time step
    pub interval: u64,
    /// Digits in the code
    pub digits: u32,
}

impl Default for TotpParams {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            digits: DEFAULT_DIGITS,
        }
    }
}

impl TotpParams {
    pub fn new(interval: u64, digits: u32) -> Result<Self, TotpError> {
        let params = Self { interval, digits };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), TotpError> {
        if self.interval == 0 {
            return Err(TotpError::InvalidParams("interval must be at least 1 second".to_string()));
        }
        if self.digits == 0 || self.digits > MAX_DIGITS {
            return Err(TotpError::InvalidParams(format!(
                "digits must be between 1 and {}, got {}",
                MAX_DIGITS, self.digits
            )));
        }
        Ok(())
    }
}

/// A validated base32 secret, canonical uppercase
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Secret(String);

impl Secret {
    /// Validate and canonicalize a user-supplied secret
    pub fn parse(raw: &str) -> Result<Self, TotpError> {
        let canonical = canonicalize(raw);
        decode_canonical(&canonical)?;
        Ok(Self(canonical))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw key bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, TotpError> {
        decode_canonical(&self.0)
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Secret {
    type Err = TotpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A fixed-width, zero-padded decimal code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Code(String);

impl Code {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for Code {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Generate a random secret from the OS RNG
pub fn generate_secret() -> Secret {
    let mut bytes = [0u8; SECRET_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    tracing::debug!("generated new TOTP secret");
    Secret(base32::encode(BASE32, &bytes))
}

/// Decode a base32 secret (case-insensitive, whitespace ignored)
pub fn decode_secret(raw: &str) -> Result<Vec<u8>, TotpError> {
    decode_canonical(&canonicalize(raw))
}

/// Current code for `secret` at unix time `now`
pub fn current_code(secret: &str, now: u64, params: &TotpParams) -> Result<Code, TotpError> {
    params.validate()?;
    let key = decode_secret(secret)?;
    Ok(hotp(&key, counter_at(now, params.interval), params.digits))
}

/// Seconds until the code at `now` expires, in `(0, interval]`
pub fn remaining_seconds(now: u64, interval: u64) -> u64 {
    let interval = interval.max(1);
    interval - (now % interval)
}

/// Time-step counter for `now`
pub fn counter_at(now: u64, interval: u64) -> u64 {
    now / interval.max(1)
}

/// RFC 4226 HOTP over raw key bytes
pub fn hotp(key: &[u8], counter: u64, digits: u32) -> Code {
    let mut mac = Hmac::<Sha1>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();
    truncate(&digest, digits)
}

/// Wall-clock unix seconds
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Dynamic truncation, RFC 4226 section 5.3
fn truncate(digest: &[u8], digits: u32) -> Code {
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = (u32::from(digest[offset]) & 0x7f) << 24
        | u32::from(digest[offset + 1]) << 16
        | u32::from(digest[offset + 2]) << 8
        | u32::from(digest[offset + 3]);
    let value = u64::from(binary) % 10u64.pow(digits);
    Code(format!("{:0>width$}", value, width = digits as usize))
}

fn canonicalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

fn decode_canonical(canonical: &str) -> Result<Vec<u8>, TotpError> {
    if canonical.is_empty() {
        return Err(TotpError::EmptySecret);
    }

    let body = canonical.trim_end_matches('=');
    let padding = canonical.len() - body.len();

    if let Some(bad) = body.chars().find(|c| !matches!(c, 'A'..='Z' | '2'..='7')) {
        return Err(TotpError::InvalidSecret(format!("invalid base32 character '{}'", bad)));
    }
    if body.is_empty() {
        return Err(TotpError::InvalidSecret("secret contains only padding".to_string()));
    }

    // Valid final-quantum lengths and the padding each one needs
    let expected_padding = match body.len() % 8 {
        0 => 0,
        2 => 6,
        4 => 4,
        5 => 3,
        7 => 1,
        _ => {
            return Err(TotpError::InvalidSecret(format!(
                "invalid base32 length {}",
                body.len()
            )))
        }
    };
    if padding != 0 && padding != expected_padding {
        return Err(TotpError::InvalidSecret("incorrect base32 padding".to_string()));
    }

    base32::decode(BASE32, body)
        .ok_or_else(|| TotpError::InvalidSecret("base32 decoding failed".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // "12345678901234567890" (RFC 4226 appendix D / RFC 6238 appendix B)
    const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
    const DEMO_SECRET: &str = "JBSWY3DPEHPK3PXP";

    fn params() -> TotpParams {
        TotpParams::default()
    }

    #[test]
    fn test_rfc4226_hotp_vectors() {
        let key = b"12345678901234567890";
        let expected = [
            "755224", "287082", "359152", "969429", "338314",
            "254676", "287922", "162583", "399871", "520489",
        ];
        for (counter, want) in expected.iter().enumerate() {
            assert_eq!(hotp(key, counter as u64, 6), *want, "counter {}", counter);
        }
    }

    #[test]
    fn test_rfc6238_sha1_vectors() {
        let eight = TotpParams::new(30, 8).unwrap();
        assert_eq!(current_code(RFC_SECRET, 59, &eight).unwrap(), "94287082");
        assert_eq!(current_code(RFC_SECRET, 1111111109, &eight).unwrap(), "07081804");
        assert_eq!(current_code(RFC_SECRET, 1234567890, &eight).unwrap(), "89005924");
        assert_eq!(current_code(RFC_SECRET, 2000000000, &eight).unwrap(), "69279037");
    }

    #[test]
    fn test_demo_secret_codes() {
        assert_eq!(current_code(DEMO_SECRET, 1, &params()).unwrap(), "282760");
        assert_eq!(current_code(DEMO_SECRET, 59, &params()).unwrap(), "996554");
    }

    #[test]
    fn test_left_zero_padding() {
        let code = current_code(RFC_SECRET, 1234567890, &params()).unwrap();
        assert_eq!(code, "005924");
        assert_eq!(code.as_str().len(), 6);
    }

    #[test]
    fn test_same_counter_same_code() {
        let first = current_code(DEMO_SECRET, 30, &params()).unwrap();
        for now in 31..60 {
            assert_eq!(current_code(DEMO_SECRET, now, &params()).unwrap(), first);
        }
    }

    #[test]
    fn test_consecutive_counters_differ() {
        let codes: Vec<Code> = [0u64, 30, 60]
            .iter()
            .map(|&t| current_code(DEMO_SECRET, t, &params()).unwrap())
            .collect();
        assert_ne!(codes[0], codes[1]);
        assert_ne!(codes[1], codes[2]);
    }

    #[test]
    fn test_remaining_seconds_range() {
        for interval in [1u64, 7, 30, 60] {
            for now in 0..(interval * 3) {
                let remaining = remaining_seconds(now, interval);
                assert!(remaining > 0 && remaining <= interval);
            }
        }
        assert_eq!(remaining_seconds(0, 30), 30);
        assert_eq!(remaining_seconds(1, 30), 29);
        assert_eq!(remaining_seconds(29, 30), 1);
        assert_eq!(remaining_seconds(30, 30), 30);
    }

    #[test]
    fn test_counter_at() {
        assert_eq!(counter_at(0, 30), 0);
        assert_eq!(counter_at(29, 30), 0);
        assert_eq!(counter_at(30, 30), 1);
        assert_eq!(counter_at(59, 30), 1);
    }

    #[test]
    fn test_malformed_secret_rejected() {
        let err = current_code("not-base32!!", 59, &params()).unwrap_err();
        assert!(matches!(err, TotpError::InvalidSecret(_)));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert_eq!(current_code("", 59, &params()).unwrap_err(), TotpError::EmptySecret);
        assert_eq!(current_code("   ", 59, &params()).unwrap_err(), TotpError::EmptySecret);
    }

    #[test]
    fn test_bad_lengths_and_padding() {
        // one, three and six trailing characters can't end a base32 string
        assert!(decode_secret("JBSWY3DPE").is_err());
        assert!(decode_secret("JBSWY3DPEHP").is_err());
        assert!(decode_secret("JBSWY3DPEHPK3P").is_err());
        // padding in the wrong amount or position
        assert!(decode_secret("JBSWY3DPEHPK3PX=").is_ok());
        assert!(decode_secret("JBSWY3DPEHPK3P==").is_err());
        assert!(decode_secret("JBSW=Y3DPEHPK3PX").is_err());
        assert!(decode_secret("========").is_err());
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let upper = decode_secret(DEMO_SECRET).unwrap();
        assert_eq!(decode_secret("jbswy3dpehpk3pxp").unwrap(), upper);
        assert_eq!(decode_secret("JBSW Y3DP EHPK 3PXP").unwrap(), upper);
        assert_eq!(upper, b"Hello!\xde\xad\xbe\xef");
    }

    #[test]
    fn test_secret_parse_canonicalizes() {
        let secret = Secret::parse(" jbsw y3dp ehpk 3pxp ").unwrap();
        assert_eq!(secret.as_str(), DEMO_SECRET);
        assert!("not-base32!!".parse::<Secret>().is_err());
    }

    #[test]
    fn test_generate_secret_round_trips() {
        let secret = generate_secret();
        assert_eq!(secret.as_str().len(), 32);
        assert!(secret
            .as_str()
            .chars()
            .all(|c| "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567".contains(c)));
        assert_eq!(secret.to_bytes().unwrap().len(), SECRET_BYTES);
        assert!(current_code(secret.as_str(), unix_now(), &params()).is_ok());
    }

    #[test]
    fn test_generate_secret_uniqueness() {
        assert_ne!(generate_secret(), generate_secret());
    }

    #[test]
    fn test_params_validation() {
        assert!(TotpParams::new(0, 6).is_err());
        assert!(TotpParams::new(30, 0).is_err());
        assert!(TotpParams::new(30, 11).is_err());
        assert!(TotpParams::new(30, 10).is_ok());

        let zero_interval = TotpParams { interval: 0, digits: 6 };
        assert!(matches!(
            current_code(DEMO_SECRET, 59, &zero_interval),
            Err(TotpError::InvalidParams(_))
        ));
    }
}
