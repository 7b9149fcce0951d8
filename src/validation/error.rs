use std::fmt::{self, Display};

/// A field-level constraint that an inbound payload violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} {constraint}")]
pub struct ValidationError {
    pub field: &'static str,
    pub constraint: Constraint,
}

impl ValidationError {
    pub fn new(field: &'static str, constraint: Constraint) -> Self {
        Self { field, constraint }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    Required,
    Length { min: usize, max: usize },
    MinLength { min: usize },
    OneOf { allowed: &'static [&'static str] },
    AtLeast { min: i64 },
}

impl Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Required => f.write_str("is required"),
            Constraint::Length { min, max } => write!(f, "must be {}-{} characters", min, max),
            Constraint::MinLength { min } => write!(f, "must be at least {} characters", min),
            Constraint::OneOf { allowed } => write!(f, "must be one of: {}", allowed.join(", ")),
            Constraint::AtLeast { min } => write!(f, "must be at least {}", min),
        }
    }
}
