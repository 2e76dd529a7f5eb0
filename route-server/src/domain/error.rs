//! Domain error types.
//!
//! These errors represent validation failures in the domain layer.
//! They are distinct from transport errors raised by the service client.

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Edge cost is negative or not a finite number
    #[error("invalid edge cost: {0}")]
    InvalidCost(f64),

    /// Itinerary segment would have fewer than two way-points
    #[error("segment needs at least two way-points, got {0}")]
    TooFewWaypoints(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::InvalidCost(-1.5);
        assert_eq!(err.to_string(), "invalid edge cost: -1.5");

        let err = DomainError::TooFewWaypoints(1);
        assert_eq!(err.to_string(), "segment needs at least two way-points, got 1");
    }
}
