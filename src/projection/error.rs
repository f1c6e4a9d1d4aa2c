//! Validation and computation failures raised by the projection engine

/// Errors returned by [`ProjectionEngine::project`](super::ProjectionEngine::project).
///
/// None of these carry a partial result: the engine either validates and
/// computes every row or returns one of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    /// An intervention magnitude was negative, NaN or infinite.
    #[error("invalid intervention parameter `{name}`: {value} (must be a finite number >= 0)")]
    InvalidParameter { name: &'static str, value: f64 },

    /// A coefficient, rate, threshold or anchor score was out of range.
    #[error("invalid projection config `{name}`: {value} ({reason})")]
    InvalidConfig {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// The projection window ends before it starts.
    #[error("invalid projection range: end year {end_year} is before start year {start_year}")]
    InvalidRange { start_year: i32, end_year: i32 },

    /// A non-finite score came out of validated inputs.
    #[error("internal projection error in {year}: {column} evaluated to {value}")]
    Computation {
        year: i32,
        column: &'static str,
        value: f64,
    },
}

impl ProjectionError {
    /// Whether the caller supplied bad input, as opposed to an internal fault.
    pub fn is_validation(&self) -> bool {
        !matches!(self, ProjectionError::Computation { .. })
    }
}
