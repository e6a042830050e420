//! Audience resolution.
//!
//! Turns a targeting rule into a concrete, deduplicated set of
//! identities. Pure over an in-memory directory snapshot, so the rules
//! are testable without a database.

use std::collections::HashSet;

use uuid::Uuid;

use nightingale_entity::notification::TargetType;
use nightingale_entity::student::Student;

/// One student directory row, reduced to what targeting needs.
#[derive(Debug, Clone)]
pub struct StudentRecord {
    /// Linked identity; `None` when the directory row is dangling.
    pub user_id: Option<Uuid>,
    /// Enrolled course.
    pub course_id: String,
    /// Admission batch year.
    pub batch_year: i32,
}

impl From<Student> for StudentRecord {
    fn from(s: Student) -> Self {
        Self {
            user_id: s.user_id,
            course_id: s.course_id,
            batch_year: s.batch_year,
        }
    }
}

/// The directory slice an audience is resolved against.
///
/// Callers load only the slice the targeting rule needs; the unused
/// side stays empty. `students` holds academically active students only.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    /// Active identities, for `all` targeting.
    pub active_users: Vec<Uuid>,
    /// Academically active students, for student-scoped targeting.
    pub students: Vec<StudentRecord>,
}

/// Resolve a targeting rule to a deduplicated audience.
///
/// Order follows first appearance in the snapshot. Dangling student
/// rows, unparseable individual references, and unparseable batch years
/// are skipped, never errors. An unknown rule resolves to nobody.
pub fn resolve_audience(
    target_type: TargetType,
    target_ids: &[String],
    snapshot: &DirectorySnapshot,
) -> Vec<Uuid> {
    let candidates: Vec<Uuid> = match target_type {
        TargetType::All => snapshot.active_users.clone(),
        TargetType::Students => snapshot
            .students
            .iter()
            .filter_map(|s| s.user_id)
            .collect(),
        TargetType::Course => {
            let courses: HashSet<&str> = target_ids.iter().map(String::as_str).collect();
            snapshot
                .students
                .iter()
                .filter(|s| courses.contains(s.course_id.as_str()))
                .filter_map(|s| s.user_id)
                .collect()
        }
        TargetType::Batch => {
            let years: HashSet<i32> = target_ids
                .iter()
                .filter_map(|id| id.trim().parse::<i32>().ok())
                .collect();
            snapshot
                .students
                .iter()
                .filter(|s| years.contains(&s.batch_year))
                .filter_map(|s| s.user_id)
                .collect()
        }
        TargetType::Individual => target_ids
            .iter()
            .filter_map(|id| Uuid::parse_str(id.trim()).ok())
            .collect(),
        TargetType::Unknown => Vec::new(),
    };

    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(user_id: Option<Uuid>, course: &str, batch: i32) -> StudentRecord {
        StudentRecord {
            user_id,
            course_id: course.to_string(),
            batch_year: batch,
        }
    }

    #[test]
    fn test_all_targets_every_active_user() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let snapshot = DirectorySnapshot {
            active_users: vec![a, b],
            students: vec![],
        };
        assert_eq!(resolve_audience(TargetType::All, &[], &snapshot), vec![a, b]);
    }

    #[test]
    fn test_students_skips_dangling_rows() {
        let a = Uuid::new_v4();
        let snapshot = DirectorySnapshot {
            active_users: vec![],
            students: vec![student(Some(a), "bsc-nursing", 2023), student(None, "gnm", 2023)],
        };
        assert_eq!(
            resolve_audience(TargetType::Students, &[], &snapshot),
            vec![a]
        );
    }

    #[test]
    fn test_course_filters_by_listed_courses() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let snapshot = DirectorySnapshot {
            active_users: vec![],
            students: vec![
                student(Some(a), "bsc-nursing", 2023),
                student(Some(b), "gnm", 2024),
            ],
        };
        let audience = resolve_audience(
            TargetType::Course,
            &["bsc-nursing".to_string()],
            &snapshot,
        );
        assert_eq!(audience, vec![a]);
    }

    #[test]
    fn test_course_with_no_enrollment_is_empty_not_error() {
        let snapshot = DirectorySnapshot {
            active_users: vec![],
            students: vec![student(Some(Uuid::new_v4()), "gnm", 2024)],
        };
        let audience = resolve_audience(TargetType::Course, &["msc-nursing".to_string()], &snapshot);
        assert!(audience.is_empty());
    }

    #[test]
    fn test_batch_skips_unparseable_years() {
        let a = Uuid::new_v4();
        let snapshot = DirectorySnapshot {
            active_users: vec![],
            students: vec![student(Some(a), "bsc-nursing", 2024)],
        };
        let audience = resolve_audience(
            TargetType::Batch,
            &["2024".to_string(), "twenty-four".to_string()],
            &snapshot,
        );
        assert_eq!(audience, vec![a]);
    }

    #[test]
    fn test_individual_dedups_and_skips_garbage() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ids = vec![a.to_string(), b.to_string(), a.to_string(), "nope".to_string()];
        let audience = resolve_audience(TargetType::Individual, &ids, &DirectorySnapshot::default());
        assert_eq!(audience, vec![a, b]);
    }

    #[test]
    fn test_unknown_rule_resolves_to_nobody() {
        let snapshot = DirectorySnapshot {
            active_users: vec![Uuid::new_v4()],
            students: vec![student(Some(Uuid::new_v4()), "gnm", 2024)],
        };
        assert!(resolve_audience(TargetType::Unknown, &[], &snapshot).is_empty());
    }
}
