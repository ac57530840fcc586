//! Temporary password policy: exactly 12 characters with at least two
//! uppercase, two lowercase, two digits, and two of `!@#$%^&*`.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

pub const PASSWORD_LENGTH: usize = 12;
pub const SPECIAL_CHARS: &str = "!@#$%^&*";
const MIN_PER_CLASS: usize = 2;

/// Known-good password substituted when a generator misbehaves.
pub const FALLBACK_PASSWORD: &str = "TempPass12!@";

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";

pub fn satisfies_policy(password: &str) -> bool {
    if password.chars().count() != PASSWORD_LENGTH {
        return false;
    }
    let count = |pred: fn(char) -> bool| password.chars().filter(|c| pred(*c)).count();
    count(|c| c.is_ascii_uppercase()) >= MIN_PER_CLASS
        && count(|c| c.is_ascii_lowercase()) >= MIN_PER_CLASS
        && count(|c| c.is_ascii_digit()) >= MIN_PER_CLASS
        && count(|c| SPECIAL_CHARS.contains(c)) >= MIN_PER_CLASS
        && password
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || SPECIAL_CHARS.contains(c))
}

/// Two from each class, the rest from their union, shuffled.
pub fn generate_password<R: Rng + ?Sized>(rng: &mut R) -> String {
    let special = SPECIAL_CHARS.as_bytes();
    let mut chars: Vec<u8> = Vec::with_capacity(PASSWORD_LENGTH);
    for class in [UPPER, LOWER, DIGITS, special] {
        chars.extend(class.choose_multiple(rng, MIN_PER_CLASS).copied());
    }

    let union: Vec<u8> = [UPPER, LOWER, DIGITS, special].concat();
    while chars.len() < PASSWORD_LENGTH {
        if let Some(c) = union.choose(rng) {
            chars.push(*c);
        }
    }

    chars.shuffle(rng);
    chars.into_iter().map(char::from).collect()
}
