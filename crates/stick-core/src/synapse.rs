//! Typed synapses between STICK neurons

use std::fmt;

use crate::neuron::NeuronRef;

/// Synaptic channel on the target neuron.
///
/// The set is closed: every synapse targets exactly one of the four
/// state variables of the multi-conductance neuron model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    /// Instantaneous membrane jump: `V += weight`
    V,
    /// Constant-current conductance: `ge += weight`
    Ge,
    /// Fast exponential conductance: `gf += weight`, decays with `tf`
    Gf,
    /// Multiplicative enable of the `gf` pathway: `gate += weight`
    Gate,
}

impl Channel {
    /// Channel name as used in logs
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::V => "V",
            Channel::Ge => "ge",
            Channel::Gf => "gf",
            Channel::Gate => "gate",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synaptic connection, immutable after creation.
///
/// A spike of `source` at time `t` delivers `weight` onto `target`'s
/// `channel` at `t + delay`.
#[derive(Debug, Clone)]
pub struct Synapse {
    /// Pre-synaptic neuron
    pub source: NeuronRef,
    /// Post-synaptic neuron
    pub target: NeuronRef,
    /// Target channel
    pub channel: Channel,
    /// Delivered weight
    pub weight: f64,
    /// Synaptic delay (ms), non-negative
    pub delay: f64,
}

impl Synapse {
    /// Create a new synapse
    pub fn new(
        source: NeuronRef,
        target: NeuronRef,
        channel: Channel,
        weight: f64,
        delay: f64,
    ) -> Self {
        Self {
            source,
            target,
            channel,
            weight,
            delay,
        }
    }
}
