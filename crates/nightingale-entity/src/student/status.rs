//! Academic status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Academic standing of a student record.
///
/// Only `Active` students are eligible audience members for
/// students/course/batch-targeted notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "academic_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AcademicStatus {
    /// Currently enrolled.
    Active,
    /// Enrollment paused (leave, suspension, unpaid fees).
    Inactive,
    /// Completed the programme.
    Graduated,
    /// Left the programme before completion.
    Dropped,
}

impl AcademicStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Graduated => "graduated",
            Self::Dropped => "dropped",
        }
    }
}

impl fmt::Display for AcademicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
