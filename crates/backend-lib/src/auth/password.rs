// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
//!
//! New hashes are scrypt PHC strings. Argon2 PHC strings are recognised and
//! reported as legacy; callers reject them and flag the employee for a reset.
use argon2::Argon2;
use rand::{seq::SliceRandom, Rng};
use scrypt::{
    password_hash::{
        rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Params, Scrypt,
};
use serde::{Deserialize, Serialize};

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 10;

/// Default length of generated temporary passwords
pub const TEMPORARY_PASSWORD_LENGTH: usize = 12;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"1234567890";
const SYMBOLS: &[u8] = b"!@#$%^&*()";
const CHARACTER_CLASSES: [&[u8]; 4] = [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS];

/// Password complexity requirements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordRequirements {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

/// Result of checking a candidate against a stored hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Match,
    Mismatch,
    /// Candidate matches, but the stored hash uses a retired algorithm
    LegacyMatch,
    /// Stored hash cannot be parsed or uses an unknown algorithm
    Malformed,
}

/// scrypt cost parameters for a given `log_n`
pub fn scrypt_params(log_n: u8) -> Result<Params, scrypt::errors::InvalidParams> {
    Params::new(log_n, Params::RECOMMENDED_R, Params::RECOMMENDED_P, Params::RECOMMENDED_LEN)
}

/// Hash a password using scrypt
pub fn hash_password(plain: &str, params: Params) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)?
        .to_string();
    Ok(hash)
}

/// Verify a password against a stored hash
pub fn verify_password(hash: &str, plain: &str) -> Verification {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return Verification::Malformed,
    };

    let (result, matched) = match parsed_hash.algorithm.as_str() {
        "scrypt" => (
            Scrypt.verify_password(plain.as_bytes(), &parsed_hash),
            Verification::Match,
        ),
        "argon2id" | "argon2i" | "argon2d" => (
            Argon2::default().verify_password(plain.as_bytes(), &parsed_hash),
            Verification::LegacyMatch,
        ),
        _ => return Verification::Malformed,
    };

    match result {
        Ok(()) => matched,
        Err(HashError::Password) => Verification::Mismatch,
        Err(_) => Verification::Malformed,
    }
}

/// Check if a password meets the complexity requirements
pub fn validate_password_strength(password: &str, requirements: &PasswordRequirements) -> bool {
    if password.chars().count() < requirements.min_length {
        return false;
    }

    if requirements.require_uppercase && !password.chars().any(char::is_uppercase) {
        return false;
    }

    if requirements.require_lowercase && !password.chars().any(char::is_lowercase) {
        return false;
    }

    if requirements.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    if requirements.require_special && !password.chars().any(|c| !c.is_alphanumeric()) {
        return false;
    }

    true
}

/// Random password with at least one character of every class.
///
/// Lengths below the number of classes are raised to it.
pub fn generate_temporary_password(length: usize) -> String {
    let length = length.max(CHARACTER_CLASSES.len());
    let alphabet = CHARACTER_CLASSES.concat();
    let mut rng = rand::rng();

    let mut chars: Vec<u8> = CHARACTER_CLASSES
        .iter()
        .map(|class| class[rng.random_range(0..class.len())])
        .collect();
    while chars.len() < length {
        chars.push(alphabet[rng.random_range(0..alphabet.len())]);
    }
    chars.shuffle(&mut rng);

    chars.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> Params {
        scrypt_params(4).unwrap()
    }

    #[test]
    fn test_password_hashing_and_verification() {
        let hash = hash_password("SecureP@ssw0rd", cheap()).unwrap();

        assert_ne!(hash, "SecureP@ssw0rd");
        assert!(hash.starts_with("$scrypt$"));
        assert_eq!(verify_password(&hash, "SecureP@ssw0rd"), Verification::Match);
        assert_eq!(verify_password(&hash, "securep@ssw0rd"), Verification::Mismatch);
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let a = hash_password("NewPass1!", cheap()).unwrap();
        let b = hash_password("NewPass1!", cheap()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_not_a_panic() {
        assert_eq!(verify_password("", "anything"), Verification::Malformed);
        assert_eq!(verify_password("plaintext", "plaintext"), Verification::Malformed);
        assert_eq!(
            verify_password("$2a$12$K3JNi5dYFFdtYOO7qtCQHeAkI.3zq3m83NmE4G83FKgc4T281xvU6", "x"),
            Verification::Malformed
        );
    }

    #[test]
    fn test_argon2_hash_is_legacy() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"OldPass1!", &salt)
            .unwrap()
            .to_string();

        assert_eq!(verify_password(&hash, "OldPass1!"), Verification::LegacyMatch);
        assert_eq!(verify_password(&hash, "wrong"), Verification::Mismatch);
    }

    #[test]
    fn test_temporary_password_shape() {
        let password = generate_temporary_password(TEMPORARY_PASSWORD_LENGTH);
        assert_eq!(password.len(), TEMPORARY_PASSWORD_LENGTH);
        for class in CHARACTER_CLASSES {
            assert!(password.bytes().any(|b| class.contains(&b)));
        }

        assert_eq!(generate_temporary_password(1).len(), CHARACTER_CLASSES.len());
        assert_ne!(
            generate_temporary_password(TEMPORARY_PASSWORD_LENGTH),
            generate_temporary_password(TEMPORARY_PASSWORD_LENGTH)
        );
    }

    #[test]
    fn test_password_strength_validation() {
        let requirements = PasswordRequirements::default();

        assert!(validate_password_strength("SecureP@ssw0rd", &requirements));
        // Too short
        assert!(!validate_password_strength("Short1!", &requirements));
        // Missing uppercase
        assert!(!validate_password_strength("securep@ssw0rd", &requirements));
        // Missing lowercase
        assert!(!validate_password_strength("SECUREP@SSW0RD", &requirements));
        // Missing digit
        assert!(!validate_password_strength("SecureP@ssword", &requirements));
        // Missing special character
        assert!(!validate_password_strength("SecurePassw0rd", &requirements));

        let custom_requirements = PasswordRequirements {
            min_length: 8,
            require_uppercase: false,
            require_lowercase: true,
            require_digit: true,
            require_special: false,
        };
        assert!(validate_password_strength("securepassw0rd", &custom_requirements));
    }
}
