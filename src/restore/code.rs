use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Generate a one-time restore code of `length` alphanumeric characters.
///
/// At the default length of 32 this is roughly 190 bits of entropy from the
/// thread-local CSPRNG.
pub fn generate_restore_code(length: usize) -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_restore_code() {
        let code = generate_restore_code(32);

        assert_eq!(code.len(), 32);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_codes_differ() {
        assert_ne!(generate_restore_code(32), generate_restore_code(32));
    }
}
