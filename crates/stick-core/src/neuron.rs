//! Neuron descriptors, handles, and signed header pairs

use std::fmt;
use std::sync::Arc;

use crate::error::{CoreError, Result};

/// Stable handle to a neuron, carrying its network-wide uid.
///
/// The uid is the dotted path of enclosing module names followed by the
/// neuron's local name (`"mul_2.mem_a"`). Handles are cheap to clone and
/// remain valid for the lifetime of the top-level module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NeuronRef(Arc<str>);

impl NeuronRef {
    pub(crate) fn new(uid: impl AsRef<str>) -> Self {
        Self(Arc::from(uid.as_ref()))
    }

    /// The network-wide unique identifier
    pub fn uid(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NeuronRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Membrane and synapse parameters of a STICK neuron
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeuronParams {
    /// Firing threshold (mV-equivalent, dimensionless in practice)
    pub vt: f64,
    /// Membrane time constant (ms)
    pub tm: f64,
    /// Fast synapse time constant (ms)
    pub tf: f64,
}

impl Default for NeuronParams {
    fn default() -> Self {
        Self {
            vt: 10.0,
            tm: 100.0,
            tf: 20.0,
        }
    }
}

impl NeuronParams {
    /// Create new neuron parameters with validation
    pub fn new(vt: f64, tm: f64, tf: f64) -> Result<Self> {
        if !(vt > 0.0) {
            return Err(CoreError::invalid_neuron("vt", vt.to_string(), "> 0"));
        }
        if !(tm > 0.0) {
            return Err(CoreError::invalid_neuron("tm", tm.to_string(), "> 0"));
        }
        if !(tf > 0.0) {
            return Err(CoreError::invalid_neuron("tf", tf.to_string(), "> 0"));
        }
        Ok(Self { vt, tm, tf })
    }

    /// Same parameters with a different fast time constant
    pub fn with_tf(&self, tf: f64) -> Result<Self> {
        Self::new(self.vt, self.tm, tf)
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.vt, self.tm, self.tf)?;
        Ok(())
    }
}

/// Neuron descriptor owned by a network module.
///
/// Mutable simulation state (`V`, `ge`, `gf`, `gate`) is deliberately not
/// stored here; the simulator keeps its own state vectors keyed by uid so
/// the network can be shared read-only.
#[derive(Debug, Clone)]
pub struct Neuron {
    uid: NeuronRef,
    params: NeuronParams,
}

impl Neuron {
    pub(crate) fn new(uid: NeuronRef, params: NeuronParams) -> Self {
        Self { uid, params }
    }

    /// Handle to this neuron
    pub fn handle(&self) -> NeuronRef {
        self.uid.clone()
    }

    /// The network-wide unique identifier
    pub fn uid(&self) -> &str {
        self.uid.uid()
    }

    /// Membrane parameters
    pub fn params(&self) -> &NeuronParams {
        &self.params
    }
}

/// Which side of a signed header pair a spike train belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Polarity {
    /// Positive values
    Plus,
    /// Negative values
    Minus,
}

impl Polarity {
    /// The opposite polarity
    pub fn flipped(self) -> Self {
        match self {
            Polarity::Plus => Polarity::Minus,
            Polarity::Minus => Polarity::Plus,
        }
    }

    /// Sign factor, `+1.0` or `-1.0`
    pub fn sign(self) -> f64 {
        match self {
            Polarity::Plus => 1.0,
            Polarity::Minus => -1.0,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Plus => write!(f, "+"),
            Polarity::Minus => write!(f, "-"),
        }
    }
}

/// A `(plus, minus)` neuron pair carrying one signed interval-coded value.
///
/// Wiring is always done in pairs; keeping both polarities in one value
/// object prevents connecting only half of a signed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeuronHeader {
    /// Neuron carrying positive values
    pub plus: NeuronRef,
    /// Neuron carrying negative values
    pub minus: NeuronRef,
}

impl NeuronHeader {
    /// Create a header from its two polarities
    pub fn new(plus: NeuronRef, minus: NeuronRef) -> Self {
        Self { plus, minus }
    }

    /// Select one side of the pair
    pub fn side(&self, polarity: Polarity) -> &NeuronRef {
        match polarity {
            Polarity::Plus => &self.plus,
            Polarity::Minus => &self.minus,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_validation() {
        assert!(NeuronParams::new(0.0, 100.0, 20.0).is_err());
        assert!(NeuronParams::new(10.0, -1.0, 20.0).is_err());
        assert!(NeuronParams::new(10.0, 100.0, 0.0).is_err());
        assert!(NeuronParams::new(10.0, 100.0, 20.0).is_ok());
        assert!(NeuronParams::default().validate().is_ok());
    }

    #[test]
    fn test_with_tf() {
        let p = NeuronParams::default().with_tf(5.0).unwrap();
        assert_eq!(p.tf, 5.0);
        assert_eq!(p.vt, NeuronParams::default().vt);
        assert!(NeuronParams::default().with_tf(0.0).is_err());
    }

    #[test]
    fn test_polarity() {
        assert_eq!(Polarity::Plus.flipped(), Polarity::Minus);
        assert_eq!(Polarity::Minus.sign(), -1.0);
        assert_eq!(format!("{}", Polarity::Plus), "+");
    }

    #[test]
    fn test_header_sides() {
        let h = NeuronHeader::new(NeuronRef::new("m.p"), NeuronRef::new("m.n"));
        assert_eq!(h.side(Polarity::Plus).uid(), "m.p");
        assert_eq!(h.side(Polarity::Minus).uid(), "m.n");
    }
}
