//! Password generation

use rand::Rng;
use thiserror::Error;

/// Default generated password length
pub const DEFAULT_LENGTH: usize = 12;

/// ASCII letters, digits and punctuation
const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("Password length must be at least 1")]
    EmptyLength,
}

/// Generate a random password of `length` characters
pub fn generate_password(length: usize) -> Result<String, GeneratorError> {
    if length == 0 {
        return Err(GeneratorError::EmptyLength);
    }

    let mut rng = rand::thread_rng();
    let password = (0..length)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    Ok(password)
}
