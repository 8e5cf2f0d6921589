//! Error types for the network model

use thiserror::Error;

/// Result type for network-model operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur while building networks or encoders
#[derive(Error, Debug)]
pub enum CoreError {
    /// Encoder parameters out of range
    #[error("Invalid encoder config: {parameter} = {value} (expected {constraint})")]
    InvalidEncoderConfig {
        /// Parameter name
        parameter: String,
        /// Offending value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Neuron parameters out of range
    #[error("Invalid neuron config: {parameter} = {value} (expected {constraint})")]
    InvalidNeuronConfig {
        /// Parameter name
        parameter: String,
        /// Offending value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Invalid parameter value (weights, delays)
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Offending value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Two neurons in the same module share a local name
    #[error("Duplicate neuron uid {uid}")]
    DuplicateNeuron {
        /// Colliding uid
        uid: String,
    },
}

impl CoreError {
    /// Create an invalid encoder config error
    pub fn invalid_encoder(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidEncoderConfig {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create an invalid neuron config error
    pub fn invalid_neuron(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidNeuronConfig {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
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

    /// Create a duplicate neuron error
    pub fn duplicate_neuron(uid: impl Into<String>) -> Self {
        Self::DuplicateNeuron { uid: uid.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_encoder("tmin", "0", "> 0");
        let msg = format!("{}", err);
        assert!(msg.contains("tmin") && msg.contains("> 0"));

        let err = CoreError::duplicate_neuron("add_0.acc");
        assert!(format!("{}", err).contains("add_0.acc"));
    }
}
