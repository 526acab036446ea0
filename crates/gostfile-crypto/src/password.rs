//! Password generation, strength scoring and normalization

use rand::seq::SliceRandom;
use secrecy::SecretString;

use gostfile_core::config::PasswordConfig;
use gostfile_core::{GostError, GostResult};

use crate::hash::{Hash256, Streebog256};

pub const MIN_GENERATED_LEN: usize = 8;
pub const MAX_GENERATED_LEN: usize = 128;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!#$%&()*+-.:/;<=>?@[]^_`{|}~";
/// Characters that earn the special-character point; `!` is generated but not scored.
const SCORED_SPECIAL: &[u8] = b"#$%&()*+-.:/;<=>?@[]^_`{|}~";

/// Which character classes the generator draws from, and how many characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub length: usize,
    pub lowercase: bool,
    pub uppercase: bool,
    pub digits: bool,
    pub special: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self::from(&PasswordConfig::default())
    }
}

impl From<&PasswordConfig> for GeneratorOptions {
    fn from(config: &PasswordConfig) -> Self {
        Self {
            length: config.length,
            lowercase: config.lowercase,
            uppercase: config.uppercase,
            digits: config.digits,
            special: config.special,
        }
    }
}

impl GeneratorOptions {
    fn alphabet(&self) -> Vec<u8> {
        let mut chars = Vec::new();
        for (enabled, class) in [
            (self.lowercase, LOWERCASE),
            (self.uppercase, UPPERCASE),
            (self.digits, DIGITS),
            (self.special, SPECIAL),
        ] {
            if enabled {
                chars.extend_from_slice(class);
            }
        }
        chars
    }
}

/// Draw a random password uniformly from the selected classes.
///
/// The length is clamped to `8..=128`. Selecting no class is a validation error.
pub fn generate_password(options: &GeneratorOptions) -> GostResult<SecretString> {
    let alphabet = options.alphabet();
    if alphabet.is_empty() {
        return Err(GostError::validation(
            "select at least one character class",
        ));
    }

    let length = options.length.clamp(MIN_GENERATED_LEN, MAX_GENERATED_LEN);
    let mut rng = rand::thread_rng();
    let password: String = (0..length)
        .filter_map(|_| alphabet.choose(&mut rng).map(|&b| char::from(b)))
        .collect();

    Ok(SecretString::from(password))
}

/// Score a password from 0 to 5.
///
/// Anything shorter than 8 characters scores 0. Otherwise one point each
/// for a length of at least 12, a lowercase letter, an uppercase letter,
/// a digit, and a special character other than `!`.
pub fn password_strength(password: &str) -> u8 {
    if password.chars().count() < MIN_GENERATED_LEN {
        return 0;
    }

    let checks = [
        password.chars().count() >= 12,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.bytes().any(|b| SCORED_SPECIAL.contains(&b)),
    ];
    checks.iter().filter(|&&hit| hit).count() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

impl Strength {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=2 => Self::Weak,
            3..=4 => Self::Medium,
            _ => Self::Strong,
        }
    }

    pub fn of(password: &str) -> Self {
        Self::from_score(password_strength(password))
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weak => write!(f, "weak"),
            Self::Medium => write!(f, "medium"),
            Self::Strong => write!(f, "strong"),
        }
    }
}

/// Drop every space character from typed input.
pub fn sanitize_password(input: &str) -> String {
    input.chars().filter(|&c| c != ' ').collect()
}

/// Lowercase hex Streebog-256 digest of the trimmed password.
///
/// Used in place of the raw password when `--prehash` is given, so that
/// containers written by tools which hash the password first stay readable.
pub fn prehash_password(password: &str) -> String {
    to_hex(&Streebog256.digest(password.trim().as_bytes()))
}

fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        s.push_str(&format!("{:02x}", byte));
    }
    s
}
