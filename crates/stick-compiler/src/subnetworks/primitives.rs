//! Exponential and logarithmic primitive circuits
//!
//! The two building blocks of the multiplier, exposed standalone. Both
//! run a single unsigned channel: a first/last pair of gating neurons
//! opens and closes a pathway on one accumulator, and a readout converts
//! the stored charge back into an output interval. All four synaptic
//! channels participate, with the stage delays `Tsyn` and `Tsyn + Tmin`
//! carrying the circuit.

use stick_core::{Channel, Encoder, Network, NeuronParams, NeuronRef};

use crate::Result;

use super::{build_spike_splitter, check_encoder_spacing, CircuitWeights, T_SYN};

/// Exponential circuit: input `x` maps to the output value
/// `exp(-x·Tcod/tf)`, i.e. an output interval of
/// `Tmin + Tcod·exp(-x·Tcod/tf)`.
///
/// The gated fast conductance charges the accumulator to
/// `Vt·(1 - exp(-x·Tcod/tf))` during the coding window; the linear
/// readout then needs `Tcod·exp(-x·Tcod/tf)` to cover the remainder.
#[derive(Debug)]
pub struct ExpNetwork {
    network: Network,
    input: NeuronRef,
    output: NeuronRef,
}

impl ExpNetwork {
    /// Build an exponential circuit under the given instance path
    pub fn build(path: &str, encoder: &Encoder, params: &NeuronParams) -> Result<Self> {
        check_encoder_spacing(encoder)?;
        let w = CircuitWeights::derive(encoder, params);
        let tmin = encoder.tmin();
        let mut net = Network::named(path);

        let input = net.create_neuron("input", params.clone())?;
        let acc = net.create_neuron("acc", params.clone())?;
        let output = net.create_neuron("output", params.clone())?;
        let (first, last) = build_spike_splitter(&mut net, &input, "input", params, &w)?;

        // Gate window: open Tmin after the opening spike, close on the
        // closing spike, so the fast conductance integrates for x·Tcod.
        net.connect(&first, &acc, Channel::Gf, w.gmult, T_SYN + tmin)?;
        net.connect(&first, &acc, Channel::Gate, 1.0, T_SYN + tmin)?;
        net.connect(&last, &acc, Channel::Gate, -1.0, T_SYN)?;
        // Linear readout starts the moment the window closes.
        net.connect(&last, &acc, Channel::Ge, w.wacc, T_SYN)?;

        net.connect(&last, &output, Channel::V, w.we, 2.0 * T_SYN)?;
        net.connect(&acc, &output, Channel::V, w.we, T_SYN + tmin)?;

        Ok(Self {
            network: net,
            input,
            output,
        })
    }

    /// Input neuron receiving the interval-coded spike pair
    pub fn input(&self) -> &NeuronRef {
        &self.input
    }

    /// Output neuron emitting the transformed interval
    pub fn output(&self) -> &NeuronRef {
        &self.output
    }

    /// Consume the builder, yielding the module for attachment
    pub fn into_network(self) -> Network {
        self.network
    }
}

/// Logarithmic circuit: input `x` maps to an output interval of
/// `Tmin - tf·ln(x)`, the inverse of [`ExpNetwork`] on `(0, 1]`.
///
/// The input charges the accumulator to `Vt·x`; the gated fast
/// conductance then asymptotically adds up to `Vt`, crossing threshold
/// exactly when `exp(-t/tf)` has decayed to `x`. An input of zero never
/// crosses and stalls the circuit.
#[derive(Debug)]
pub struct LogNetwork {
    network: Network,
    input: NeuronRef,
    output: NeuronRef,
}

impl LogNetwork {
    /// Build a logarithmic circuit under the given instance path
    pub fn build(path: &str, encoder: &Encoder, params: &NeuronParams) -> Result<Self> {
        check_encoder_spacing(encoder)?;
        let w = CircuitWeights::derive(encoder, params);
        let tmin = encoder.tmin();
        let mut net = Network::named(path);

        let input = net.create_neuron("input", params.clone())?;
        let acc = net.create_neuron("acc", params.clone())?;
        let output = net.create_neuron("output", params.clone())?;
        let (first, last) = build_spike_splitter(&mut net, &input, "input", params, &w)?;

        // Memory: charge Vt·x during the coding window.
        net.connect(&first, &acc, Channel::Ge, w.wacc, T_SYN + tmin)?;
        net.connect(&last, &acc, Channel::Ge, -w.wacc, T_SYN)?;
        // Log readout through the gated fast conductance.
        net.connect(&last, &acc, Channel::Gf, w.gmult, T_SYN)?;
        net.connect(&last, &acc, Channel::Gate, 1.0, T_SYN)?;

        net.connect(&last, &output, Channel::V, w.we, 2.0 * T_SYN)?;
        net.connect(&acc, &output, Channel::V, w.we, T_SYN + tmin)?;

        Ok(Self {
            network: net,
            input,
            output,
        })
    }

    /// Input neuron receiving the interval-coded spike pair
    pub fn input(&self) -> &NeuronRef {
        &self.input
    }

    /// Output neuron emitting the transformed interval
    pub fn output(&self) -> &NeuronRef {
        &self.output
    }

    /// Consume the builder, yielding the module for attachment
    pub fn into_network(self) -> Network {
        self.network
    }
}
