use std::fmt;

/// Typed error for generation failures — enables reliable downcast in
/// callers that need to tell bad input text, bad plan wiring and exhausted
/// port capacity apart instead of fragile string matching.
///
/// Every variant names the entity whose constraint was violated. Nothing
/// here is retryable: generation aborts on the first error and the
/// transaction rolls the inventory back to its pre-run state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// Malformed port-specification text.
    Specification { entity: String, detail: String },
    /// A plan that cannot be wired as declared.
    Configuration { entity: String, detail: String },
    /// An allocation request exceeding the port slots a zone has left.
    Capacity { entity: String, detail: String },
}

impl TopologyError {
    pub fn specification(entity: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Specification {
            entity: entity.into(),
            detail: detail.into(),
        }
    }

    pub fn configuration(entity: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Configuration {
            entity: entity.into(),
            detail: detail.into(),
        }
    }

    pub fn capacity(entity: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Capacity {
            entity: entity.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Specification { entity, detail } => {
                write!(f, "invalid port specification ({}): {}", entity, detail)
            }
            Self::Configuration { entity, detail } => {
                write!(f, "configuration error ({}): {}", entity, detail)
            }
            Self::Capacity { entity, detail } => {
                write!(f, "capacity exhausted ({}): {}", entity, detail)
            }
        }
    }
}

impl std::error::Error for TopologyError {}
