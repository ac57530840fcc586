//! Display-name helpers shared by the field extractor and profile generators.

use rand::seq::IndexedRandom;
use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Michael", "Sarah", "David", "Emily", "Robert", "Jessica", "William",
    "Ashley", "James", "Amanda", "Daniel", "Nicole", "Matthew", "Elizabeth", "Anthony", "Helen",
    "Mark", "Rachel", "Steven", "Catherine", "Andrew", "Maria", "Kevin", "Julie", "Brian",
    "Victoria", "Jason", "Christine", "Ryan", "Lauren", "Jacob", "Megan", "Eric", "Andrea",
    "Samuel", "Samantha", "Patrick", "Charlotte", "Aaron", "Priya", "Arjun", "Ananya", "Rahul",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Martinez",
    "Wilson", "Anderson", "Thomas", "Taylor", "Moore", "Jackson", "Martin", "Lee", "Thompson",
    "White", "Harris", "Clark", "Lewis", "Robinson", "Walker", "Young", "Allen", "King",
    "Wright", "Scott", "Nguyen", "Hill", "Green", "Adams", "Baker", "Campbell", "Mitchell",
    "Carter", "Evans", "Turner", "Parker", "Collins", "Patel", "Sharma", "Iyer", "Reddy",
];

/// Builds "First Last" from a dotted email local-part such as `jane.doe@...`.
/// Returns `None` when the local-part has fewer than two usable segments.
pub fn name_from_email(email: &str) -> Option<String> {
    let local = email.split('@').next()?;
    let segments: Vec<String> = local
        .split('.')
        .map(|s| s.trim_matches(|c: char| !c.is_alphabetic()))
        .filter(|s| !s.is_empty())
        .map(title_case)
        .collect();
    if segments.len() < 2 {
        return None;
    }
    Some(segments.join(" "))
}

/// Deterministic name for fallback profiles: every local-part segment title-cased.
pub fn fallback_name(email: &str) -> String {
    let local = email.split('@').next().unwrap_or(email);
    let name = local
        .split(['.', '_', '-'])
        .filter(|s| !s.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");
    if name.is_empty() {
        "Trainee".to_string()
    } else {
        name
    }
}

pub fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Morgan");
    format!("{first} {last}")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_name_from_dotted_email() {
        assert_eq!(
            name_from_email("jane.doe@example.com").as_deref(),
            Some("Jane Doe")
        );
        assert_eq!(
            name_from_email("MARY.ann.SMITH@example.com").as_deref(),
            Some("Mary Ann Smith")
        );
    }

    #[test]
    fn test_name_from_undotted_email_is_none() {
        assert_eq!(name_from_email("jdoe42@example.com"), None);
        assert_eq!(name_from_email("jane.42@example.com"), None);
    }

    #[test]
    fn test_fallback_name_is_deterministic() {
        assert_eq!(fallback_name("jane_doe@example.com"), "Jane Doe");
        assert_eq!(fallback_name("jdoe@example.com"), "Jdoe");
        assert_eq!(fallback_name("@example.com"), "Trainee");
    }

    #[test]
    fn test_random_name_has_two_parts() {
        let mut rng = StdRng::seed_from_u64(7);
        let name = random_name(&mut rng);
        assert_eq!(name.split_whitespace().count(), 2);
    }
}
