/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors surfaced by the survival engine.
///
/// Transient world-query failures are not errors: those degrade to a
/// per-player skip inside the tick. `SimError` covers caller contract
/// violations, which must fail loudly instead of being clamped away.
/// Untracked players are not an error either: accessors return `Option`
/// and mutators create the record lazily.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// An amount passed to a mutating operation was negative or non-finite.
    #[error("invalid amount {amount}: must be finite and non-negative")]
    InvalidAmount {
        /// The rejected amount.
        amount: f64,
    },

    /// A configuration value is outside its permitted range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_problem() {
        let err = SimError::InvalidAmount { amount: -3.0 };
        assert!(err.to_string().contains("-3"));
        let err = SimError::InvalidConfig("stamina max must be positive".into());
        assert!(err.to_string().contains("stamina max"));
    }
}
