//! Targeting rule enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a notification's `target_ids` are interpreted.
///
/// Stored as TEXT rather than a database enum: an unrecognized value
/// decodes to [`TargetType::Unknown`], which the audience resolver maps
/// to an empty receiver set (explicit fallback, not an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    /// Every active identity in the directory.
    All,
    /// Every academically active student.
    Students,
    /// Active students enrolled in one of the listed courses.
    Course,
    /// Active students admitted in one of the listed batch years.
    Batch,
    /// The listed identity references, verbatim.
    Individual,
    /// Unrecognized targeting rule; resolves to nobody.
    #[serde(other)]
    Unknown,
}

impl Default for TargetType {
    fn default() -> Self {
        Self::All
    }
}

impl TargetType {
    /// Return the target type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Students => "students",
            Self::Course => "course",
            Self::Batch => "batch",
            Self::Individual => "individual",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a stored value, falling back to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s {
            "all" => Self::All,
            "students" => Self::Students,
            "course" => Self::Course,
            "batch" => Self::Batch,
            "individual" => Self::Individual,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl sqlx::Type<sqlx::Postgres> for TargetType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for TargetType {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        let s = self.as_str();
        <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&s, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for TargetType {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_values() {
        assert_eq!(TargetType::parse("batch"), TargetType::Batch);
        assert_eq!(TargetType::parse("individual"), TargetType::Individual);
    }

    #[test]
    fn test_parse_unknown_falls_back() {
        assert_eq!(TargetType::parse("everyone"), TargetType::Unknown);
        assert_eq!(TargetType::parse(""), TargetType::Unknown);
    }

    #[test]
    fn test_serde_unknown_fallback() {
        let t: TargetType = serde_json::from_str("\"faculty-only\"").unwrap();
        assert_eq!(t, TargetType::Unknown);
    }
}
