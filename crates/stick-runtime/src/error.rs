//! Error types for the STICK runtime

use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur in the STICK runtime
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Network model error
    #[error("Network model error: {source}")]
    Core {
        #[from]
        /// Source network-model error
        source: stick_core::CoreError,
    },

    /// Two neurons resolve to the same uid; the network is malformed
    #[error("Duplicate neuron uid {uid}")]
    DuplicateUid {
        /// Colliding uid
        uid: String,
    },

    /// Neuron not found
    #[error("Neuron {uid} not found")]
    NeuronNotFound {
        /// Uid that was not found
        uid: String,
    },

    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// A membrane voltage became non-finite
    #[error("Simulation diverged at {time_ms}ms: non-finite voltage on {uid}")]
    SimulationDiverged {
        /// Neuron whose voltage diverged
        uid: String,
        /// Simulated time of the failed step (ms)
        time_ms: f64,
    },

    /// The output reader found both or neither polarity with two spikes
    #[error(
        "Undecodable output: plus {plus_uid} spiked {plus_count} times, \
         minus {minus_uid} spiked {minus_count} times (exactly one side must spike twice)"
    )]
    UndecodableOutput {
        /// Plus-side neuron
        plus_uid: String,
        /// Spikes observed on the plus side
        plus_count: usize,
        /// Minus-side neuron
        minus_uid: String,
        /// Spikes observed on the minus side
        minus_count: usize,
    },
}

impl RuntimeError {
    /// Create a duplicate uid error
    pub fn duplicate_uid(uid: impl Into<String>) -> Self {
        Self::DuplicateUid { uid: uid.into() }
    }

    /// Create a neuron-not-found error
    pub fn neuron_not_found(uid: impl Into<String>) -> Self {
        Self::NeuronNotFound { uid: uid.into() }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create a divergence error
    pub fn diverged(uid: impl Into<String>, time_ms: f64) -> Self {
        Self::SimulationDiverged {
            uid: uid.into(),
            time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RuntimeError::diverged("mul_0.expo", 42.5);
        let msg = format!("{}", err);
        assert!(msg.contains("mul_0.expo") && msg.contains("42.5"));

        let err = RuntimeError::invalid_parameter("dt", "0", "> 0");
        assert!(matches!(err, RuntimeError::InvalidParameter { .. }));
    }
}
