use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};

const TOKEN_BYTES: usize = 32;

/// Create a new opaque session token from the OS CSPRNG.
///
/// # Errors
/// Returns an error if the operating system cannot supply random bytes.
pub fn generate_session_token() -> Result<String, rand::Error> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn token_is_url_safe_and_unpadded() {
        let token = generate_session_token().unwrap();
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn tokens_do_not_repeat() {
        let a = generate_session_token().unwrap();
        let b = generate_session_token().unwrap();
        assert_ne!(a, b);
    }
}
