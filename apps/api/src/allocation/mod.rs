//! Batch allocator: greedy, priority-ordered assignment of candidates to
//! capacity-bounded skill buckets.
//!
//! Algorithm:
//! 1. For each skill in priority order, scan the still-unallocated candidates
//!    in input order and move every holder of that skill into the skill's
//!    bucket until it reaches `capacity`.
//! 2. Whatever is left goes to overflow.
//!
//! A candidate with several skills lands in the earliest-priority bucket that
//! still has room. Emails are the dedup key: a repeated email is dropped, so no
//! email appears twice across buckets and overflow. Output is a pure function
//! of the input order, which keeps retried uploads reproducible.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::models::batch::ExtractedCandidate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillBucket {
    pub skill: String,
    pub trainees: Vec<ExtractedCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Allocation {
    /// One bucket per priority skill, in priority order; buckets may be empty.
    pub buckets: Vec<SkillBucket>,
    pub overflow: Vec<ExtractedCandidate>,
    /// Candidates discarded because their email was already placed.
    pub duplicates: Vec<ExtractedCandidate>,
}

impl Allocation {
    pub fn bucket(&self, skill: &str) -> &[ExtractedCandidate] {
        self.buckets
            .iter()
            .find(|b| b.skill == skill)
            .map(|b| b.trainees.as_slice())
            .unwrap_or(&[])
    }

    /// Candidates placed in a bucket or in overflow.
    pub fn total_allocated(&self) -> usize {
        self.buckets.iter().map(|b| b.trainees.len()).sum::<usize>() + self.overflow.len()
    }
}

pub fn allocate(
    candidates: Vec<ExtractedCandidate>,
    skill_priority: &[String],
    capacity: usize,
) -> Allocation {
    let mut allocated_emails: HashSet<String> = HashSet::new();
    let mut duplicates = Vec::new();

    // Same email twice in one upload: keep the first occurrence only.
    let mut unallocated: Vec<ExtractedCandidate> = Vec::with_capacity(candidates.len());
    let mut seen: HashSet<String> = HashSet::new();
    for candidate in candidates {
        if seen.insert(candidate.email.clone()) {
            unallocated.push(candidate);
        } else {
            warn!(
                "Dropping duplicate candidate {} from {}",
                candidate.email, candidate.source_file
            );
            duplicates.push(candidate);
        }
    }

    let mut buckets: Vec<SkillBucket> = Vec::with_capacity(skill_priority.len());
    for skill in skill_priority {
        let mut bucket = Vec::new();
        let mut remaining = Vec::with_capacity(unallocated.len());

        for candidate in unallocated {
            if bucket.len() < capacity
                && candidate.has_skill(skill)
                && !allocated_emails.contains(&candidate.email)
            {
                allocated_emails.insert(candidate.email.clone());
                bucket.push(candidate);
            } else {
                remaining.push(candidate);
            }
        }

        unallocated = remaining;
        buckets.push(SkillBucket {
            skill: skill.clone(),
            trainees: bucket,
        });
    }

    Allocation {
        buckets,
        overflow: unallocated,
        duplicates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn candidate(email: &str, skills: &[&str]) -> ExtractedCandidate {
        ExtractedCandidate {
            name: format!("Name {email}"),
            email: email.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            source_file: format!("{email}.pdf"),
        }
    }

    fn priority(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn emails(list: &[ExtractedCandidate]) -> Vec<&str> {
        list.iter().map(|c| c.email.as_str()).collect()
    }

    #[test]
    fn test_one_per_skill_plus_overflow() {
        let input = vec![
            candidate("py@x.io", &["python"]),
            candidate("jv@x.io", &["java"]),
            candidate("go@x.io", &["golang"]),
        ];
        let result = allocate(input, &priority(&["python", "java"]), 50);

        assert_eq!(emails(result.bucket("python")), vec!["py@x.io"]);
        assert_eq!(emails(result.bucket("java")), vec!["jv@x.io"]);
        assert_eq!(emails(&result.overflow), vec!["go@x.io"]);
        assert_eq!(result.total_allocated(), 3);
    }

    #[test]
    fn test_multi_skill_candidate_goes_to_earliest_priority() {
        let input = vec![candidate("both@x.io", &["python", "java"])];
        let result = allocate(input, &priority(&["java", "python"]), 10);

        assert_eq!(emails(result.bucket("java")), vec!["both@x.io"]);
        assert!(result.bucket("python").is_empty());
        assert!(result.overflow.is_empty());
    }

    #[test]
    fn test_full_bucket_spills_to_next_matching_skill() {
        let input = vec![
            candidate("a@x.io", &["python"]),
            candidate("b@x.io", &["python", "java"]),
        ];
        let result = allocate(input, &priority(&["python", "java"]), 1);

        assert_eq!(emails(result.bucket("python")), vec!["a@x.io"]);
        assert_eq!(emails(result.bucket("java")), vec!["b@x.io"]);
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let input: Vec<_> = (0..7)
            .map(|i| candidate(&format!("p{i}@x.io"), &["python"]))
            .collect();
        let result = allocate(input, &priority(&["python"]), 3);

        assert_eq!(result.bucket("python").len(), 3);
        assert_eq!(result.overflow.len(), 4);
        assert_eq!(
            emails(result.bucket("python")),
            vec!["p0@x.io", "p1@x.io", "p2@x.io"]
        );
    }

    #[test]
    fn test_zero_capacity_sends_everything_to_overflow() {
        let input = vec![candidate("a@x.io", &["python"]), candidate("b@x.io", &["java"])];
        let result = allocate(input, &priority(&["python", "java"]), 0);

        assert!(result.buckets.iter().all(|b| b.trainees.is_empty()));
        assert_eq!(emails(&result.overflow), vec!["a@x.io", "b@x.io"]);
    }

    #[test]
    fn test_empty_input_yields_empty_buckets() {
        let result = allocate(vec![], &priority(&["python", "java"]), 5);
        assert_eq!(result.buckets.len(), 2);
        assert!(result.buckets.iter().all(|b| b.trainees.is_empty()));
        assert!(result.overflow.is_empty());
        assert_eq!(result.total_allocated(), 0);
    }

    #[test]
    fn test_duplicate_email_placed_once() {
        let input = vec![
            candidate("dup@x.io", &["java"]),
            candidate("dup@x.io", &["python"]),
            candidate("dup@x.io", &["rust"]),
        ];
        let result = allocate(input, &priority(&["python", "java"]), 5);

        let mut all: Vec<&str> = result
            .buckets
            .iter()
            .flat_map(|b| emails(&b.trainees))
            .collect();
        all.extend(emails(&result.overflow));
        assert_eq!(all, vec!["dup@x.io"]);
        assert_eq!(emails(result.bucket("java")), vec!["dup@x.io"]);
        assert_eq!(result.duplicates.len(), 2);
    }

    #[test]
    fn test_allocation_is_deterministic() {
        let input: Vec<_> = (0..20)
            .map(|i| {
                let skills: &[&str] = match i % 4 {
                    0 => &["python"],
                    1 => &["java", "python"],
                    2 => &[".net"],
                    _ => &["cobol"],
                };
                candidate(&format!("c{i}@x.io"), skills)
            })
            .collect();
        let skills = priority(&["python", "java", ".net"]);

        let first = allocate(input.clone(), &skills, 4);
        let second = allocate(input, &skills, 4);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_bucket_is_empty_slice() {
        let result = allocate(vec![], &priority(&["python"]), 5);
        assert!(result.bucket("java").is_empty());
    }
}
