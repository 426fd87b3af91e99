//! Error type for the fluid cursor solver
//!
//! The solver is a deterministic numerical pipeline: once its fields exist, no
//! stage can fail. Errors only come from configuration values outside their
//! valid range and from field allocation.

use std::fmt;

/// Errors surfaced by solver construction, resize and configuration setters.
#[derive(Debug, Clone, PartialEq)]
pub enum FluidError {
    /// A configuration value is outside its valid range.
    InvalidConfig {
        /// Name of the offending `SimulationConfig` field
        field: &'static str,
        /// Human-readable constraint that was violated
        reason: String,
    },
    /// The requested grid exceeds the configured cell budget.
    GridTooLarge {
        /// Requested grid width in cells
        width: usize,
        /// Requested grid height in cells
        height: usize,
        /// Maximum number of cells allowed by the configuration
        max_cells: usize,
    },
    /// The allocator refused the buffers for a field.
    Allocation {
        /// Debug label of the field being allocated
        field: &'static str,
        /// Number of `f32` values requested per buffer
        len: usize,
    },
}

impl FluidError {
    /// Convenience constructor for configuration errors.
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this error came from field allocation rather than configuration.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::GridTooLarge { .. } | Self::Allocation { .. })
    }
}

impl fmt::Display for FluidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid config value for '{field}': {reason}")
            }
            Self::GridTooLarge {
                width,
                height,
                max_cells,
            } => write!(
                f,
                "grid {width}x{height} exceeds the cell budget of {max_cells} cells"
            ),
            Self::Allocation { field, len } => {
                write!(f, "failed to allocate {len} values for field '{field}'")
            }
        }
    }
}

impl std::error::Error for FluidError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = FluidError::invalid_config("dissipation", "must be in (0, 1], got 1.5");
        assert_eq!(
            err.to_string(),
            "invalid config value for 'dissipation': must be in (0, 1], got 1.5"
        );

        let err = FluidError::GridTooLarge {
            width: 4000,
            height: 3000,
            max_cells: 1_000_000,
        };
        assert!(err.to_string().contains("4000x3000"));
        assert!(err.is_allocation_failure());
    }

    #[test]
    fn test_config_errors_are_not_allocation_failures() {
        let err = FluidError::invalid_config("dt", "must be positive");
        assert!(!err.is_allocation_failure());
    }
}
