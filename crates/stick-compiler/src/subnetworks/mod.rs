//! Pre-designed STICK circuits, one per operator
//!
//! Every subnetwork is parameterised by the shared interval encoder and
//! a neuron parameter set, exposes its ports as `(plus, minus)` header
//! pairs, and is built directly under its final instance path so that
//! captured handles stay valid after the module is attached.
//!
//! The weight and delay constants follow the interval-coding circuit
//! algebra of Lagorce et al. 2015: `we` fires a resting neuron outright,
//! `wacc` charges one to threshold in exactly `Tcod`, and `gmult` scales
//! the gated fast conductance so its integral saturates at `Vt`.

use stick_core::{Channel, Encoder, Network, NeuronParams, NeuronRef};

use crate::Result;

mod adder;
mod injector;
mod multiplier;
mod primitives;
mod signflip;

pub use adder::AdderNetwork;
pub use injector::InjectorNetwork;
pub use multiplier::SignedMultiplierNormNetwork;
pub use primitives::{ExpNetwork, LogNetwork};
pub use signflip::SignFlipperNetwork;

/// Fabric synaptic delay between circuit stages (ms)
pub const T_SYN: f64 = 1.0;

/// Arbitration resolution of winner-take-all sign decisions (ms).
/// Must stay at or above the simulation step for tie-breaks to order.
pub const T_NEU: f64 = 0.1;

/// Circuit weights derived from the encoder and neuron parameters
#[derive(Debug, Clone)]
pub struct CircuitWeights {
    /// Excitatory jump, fires a resting neuron: `Vt`
    pub we: f64,
    /// Inhibitory jump: `-Vt`
    pub wi: f64,
    /// Constant current reaching `Vt` in exactly `Tcod`: `Vt·tm/Tcod`
    pub wacc: f64,
    /// Gated fast conductance whose integral saturates at `Vt`: `Vt·tm/tf`
    pub gmult: f64,
}

impl CircuitWeights {
    /// Derive the weight set for one encoder/parameter combination
    pub fn derive(encoder: &Encoder, params: &NeuronParams) -> Self {
        Self {
            we: params.vt,
            wi: -params.vt,
            wacc: params.vt * params.tm / encoder.tcod(),
            gmult: params.vt * params.tm / params.tf,
        }
    }
}

/// Split an interval-coded spike pair into `first` and `last` events.
///
/// `{tag}_first` fires once on the opening spike (a trailing inhibition
/// disarms it before the closing spike lands), `{tag}_last` fires once on
/// the closing spike (two half-weight jumps are needed to cross
/// threshold). Requires `Tmin > Tsyn` so the disarm lands in between.
pub(crate) fn build_spike_splitter(
    net: &mut Network,
    input: &NeuronRef,
    tag: &str,
    params: &NeuronParams,
    w: &CircuitWeights,
) -> Result<(NeuronRef, NeuronRef)> {
    let first = net.create_neuron(&format!("{}_first", tag), params.clone())?;
    let last = net.create_neuron(&format!("{}_last", tag), params.clone())?;
    net.connect(input, &first, Channel::V, w.we, T_SYN)?;
    net.connect(input, &first, Channel::V, w.wi, 2.0 * T_SYN)?;
    net.connect(input, &last, Channel::V, w.we / 2.0, T_SYN)?;
    Ok((first, last))
}

/// Reject encoders whose `Tmin` cannot separate splitter events
pub(crate) fn check_encoder_spacing(encoder: &Encoder) -> Result<()> {
    if encoder.tmin() <= T_SYN {
        return Err(crate::CompilerError::Message(format!(
            "encoder Tmin = {}ms must exceed the fabric delay {}ms",
            encoder.tmin(),
            T_SYN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_weights() {
        let enc = Encoder::default();
        let params = NeuronParams::default();
        let w = CircuitWeights::derive(&enc, &params);
        assert_eq!(w.we, 10.0);
        assert_eq!(w.wi, -10.0);
        assert_eq!(w.wacc, 10.0 * 100.0 / 100.0);
        assert_eq!(w.gmult, 10.0 * 100.0 / 20.0);
    }

    #[test]
    fn spacing_check() {
        assert!(check_encoder_spacing(&Encoder::default()).is_ok());
        let tight = Encoder::new(0.5, 100.0).unwrap();
        assert!(check_encoder_spacing(&tight).is_err());
    }
}
