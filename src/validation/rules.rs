//! Single-field checks. Lengths count characters, not bytes.

use crate::validation::error::{Constraint, ValidationError};

/// A closed enumeration that can be parsed from its lowercase name.
pub trait Choice: Sized + Copy {
    const NAMES: &'static [&'static str];

    fn from_name(name: &str) -> Option<Self>;
}

pub fn length(field: &'static str, value: String, min: usize, max: usize) -> Result<String, ValidationError> {
    let n = value.chars().count();
    if n < min || n > max {
        return Err(ValidationError::new(field, Constraint::Length { min, max }));
    }
    Ok(value)
}

pub fn min_length(field: &'static str, value: String, min: usize) -> Result<String, ValidationError> {
    if value.chars().count() < min {
        return Err(ValidationError::new(field, Constraint::MinLength { min }));
    }
    Ok(value)
}

pub fn one_of<C: Choice>(field: &'static str, value: &str) -> Result<C, ValidationError> {
    C::from_name(value).ok_or_else(|| ValidationError::new(
        field,
        Constraint::OneOf { allowed: C::NAMES },
    ))
}

pub fn at_least(field: &'static str, value: i64, min: i64) -> Result<i64, ValidationError> {
    if value < min {
        return Err(ValidationError::new(field, Constraint::AtLeast { min }));
    }
    Ok(value)
}

pub fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new(field, Constraint::Required));
    }
    Ok(())
}

/// Applies `check` to a field that may be absent. Absent stays absent.
pub fn optional<T, U>(
    value: Option<T>,
    check: impl FnOnce(T) -> Result<U, ValidationError>,
) -> Result<Option<U>, ValidationError> {
    value.map(check).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IncidentStatus;

    #[test]
    fn test_length_counts_characters() {
        // Three characters, nine bytes.
        assert!(length("title", "火事だ".into(), 3, 100).is_ok());
        assert!(length("title", "ab".into(), 3, 100).is_err());
        assert!(length("title", "x".repeat(101), 3, 100).is_err());
        assert!(length("title", "x".repeat(100), 3, 100).is_ok());
    }

    #[test]
    fn test_one_of_is_exact() {
        assert_eq!(one_of::<IncidentStatus>("status", "closed"), Ok(IncidentStatus::Closed));
        assert!(one_of::<IncidentStatus>("status", "Closed").is_err());
        assert!(one_of::<IncidentStatus>("status", "").is_err());
    }

    #[test]
    fn test_optional_skips_absent() {
        let absent: Option<String> = None;
        assert_eq!(optional(absent, |v| length("name", v, 2, 5)), Ok(None));
        assert!(optional(Some("a".to_string()), |v| length("name", v, 2, 5)).is_err());
    }
}
