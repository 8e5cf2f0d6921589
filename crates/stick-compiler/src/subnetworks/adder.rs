//! Signed adder circuit

use stick_core::{Channel, Encoder, Network, NeuronHeader, NeuronParams};

use crate::Result;

use super::{build_spike_splitter, check_encoder_spacing, CircuitWeights, T_NEU, T_SYN};

/// Signed addition of two interval-coded values.
///
/// Both operands accumulate onto one charge accumulator with
/// polarity-dependent sign, at half scale so the stored voltage stays
/// strictly below threshold for any sum in `[-1, 1]`. Once both operands
/// have completed, a shared readout current races the accumulator
/// against a zero-reference: the side that fires first fixes the sign,
/// and the gap between the two firings carries the magnitude. A
/// winner-take-all pair of sign neurons guards the outputs so that
/// exactly one of `out.plus` / `out.minus` emits a spike pair.
#[derive(Debug)]
pub struct AdderNetwork {
    network: Network,
    input_a: NeuronHeader,
    input_b: NeuronHeader,
    output: NeuronHeader,
}

impl AdderNetwork {
    /// Build an adder under the given instance path
    pub fn build(path: &str, encoder: &Encoder, params: &NeuronParams) -> Result<Self> {
        check_encoder_spacing(encoder)?;
        let w = CircuitWeights::derive(encoder, params);
        let tmin = encoder.tmin();
        let mut net = Network::named(path);

        let a_plus = net.create_neuron("a_plus", params.clone())?;
        let a_minus = net.create_neuron("a_minus", params.clone())?;
        let b_plus = net.create_neuron("b_plus", params.clone())?;
        let b_minus = net.create_neuron("b_minus", params.clone())?;

        let acc = net.create_neuron("acc", params.clone())?;
        let zero = net.create_neuron("zero", params.clone())?;
        let sync = net.create_neuron("sync", params.clone())?;
        let sign_plus = net.create_neuron("sign_plus", params.clone())?;
        let sign_minus = net.create_neuron("sign_minus", params.clone())?;
        let out_plus = net.create_neuron("out_plus", params.clone())?;
        let out_minus = net.create_neuron("out_minus", params.clone())?;

        // One lane per operand polarity. The opening spike starts the
        // half-scale charge Tmin late, the closing spike stops it, so the
        // accumulated voltage is Vt·x/2 with the operand's sign.
        let lanes = [
            (&a_plus, "a_plus", 1.0),
            (&a_minus, "a_minus", -1.0),
            (&b_plus, "b_plus", 1.0),
            (&b_minus, "b_minus", -1.0),
        ];
        for (input, tag, sign) in lanes {
            let (first, last) = build_spike_splitter(&mut net, input, tag, params, &w)?;
            net.connect(&first, &acc, Channel::Ge, sign * w.wacc / 2.0, T_SYN + tmin)?;
            net.connect(&last, &acc, Channel::Ge, -sign * w.wacc / 2.0, T_SYN)?;
            net.connect(&last, &sync, Channel::V, w.we / 2.0, T_SYN)?;
        }

        // Readout race: both accumulators charge at half rate; the
        // reference crosses after 2·Tcod, the sum after (2 - z)·Tcod.
        net.connect(&sync, &acc, Channel::Ge, w.wacc / 2.0, T_SYN)?;
        net.connect(&sync, &zero, Channel::Ge, w.wacc / 2.0, T_SYN)?;

        // Winner-take-all sign decision. The loser is inhibited before
        // its excitation arrives; a tie resolves to plus, which is why
        // the reference inhibits the plus sign a beat late.
        net.connect(&acc, &sign_plus, Channel::V, w.we, T_SYN)?;
        net.connect(&zero, &sign_plus, Channel::V, w.wi, T_SYN + T_NEU)?;
        net.connect(&zero, &sign_minus, Channel::V, w.we, T_SYN)?;
        net.connect(&acc, &sign_minus, Channel::V, w.wi, T_SYN)?;

        // Output pairs: the winning sign relays the first spike; the
        // opposite accumulator, delayed by Tmin, supplies the second.
        // The losing side is pre-charged down so neither stray arrival
        // can lift it over threshold.
        net.connect(&sign_plus, &out_plus, Channel::V, w.we, T_SYN)?;
        net.connect(&zero, &out_plus, Channel::V, w.we, 2.0 * T_SYN + tmin)?;
        net.connect(&sign_minus, &out_plus, Channel::V, 2.0 * w.wi, T_SYN)?;

        net.connect(&sign_minus, &out_minus, Channel::V, w.we, T_SYN)?;
        net.connect(&acc, &out_minus, Channel::V, w.we, 2.0 * T_SYN + tmin)?;
        net.connect(&sign_plus, &out_minus, Channel::V, 2.0 * w.wi, T_SYN)?;

        Ok(Self {
            network: net,
            input_a: NeuronHeader::new(a_plus, a_minus),
            input_b: NeuronHeader::new(b_plus, b_minus),
            output: NeuronHeader::new(out_plus, out_minus),
        })
    }

    /// First operand header pair
    pub fn input_a(&self) -> &NeuronHeader {
        &self.input_a
    }

    /// Second operand header pair
    pub fn input_b(&self) -> &NeuronHeader {
        &self.input_b
    }

    /// Output header pair
    pub fn output(&self) -> &NeuronHeader {
        &self.output
    }

    /// Consume the builder, yielding the module for attachment
    pub fn into_network(self) -> Network {
        self.network
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stick_core::Polarity;
    use stick_runtime::Simulator;

    fn run_adder(
        a: (f64, Polarity),
        b: (f64, Polarity),
    ) -> (Vec<f64>, Vec<f64>, Encoder) {
        let enc = Encoder::default();
        let adder = AdderNetwork::build("add_0", &enc, &NeuronParams::default()).unwrap();
        let in_a = adder.input_a().clone();
        let in_b = adder.input_b().clone();
        let out = adder.output().clone();
        let net = adder.into_network();

        let mut sim = Simulator::new(&net, enc.clone(), 0.01).unwrap();
        sim.apply_input_value(a.0, in_a.side(a.1), 0.0).unwrap();
        sim.apply_input_value(b.0, in_b.side(b.1), 0.0).unwrap();
        sim.simulate(320.0).unwrap();

        let plus = sim.spike_times(out.plus.uid()).unwrap().to_vec();
        let minus = sim.spike_times(out.minus.uid()).unwrap().to_vec();
        (plus, minus, enc)
    }

    #[test]
    fn positive_sum() {
        let (plus, minus, enc) = run_adder((0.2, Polarity::Plus), (0.3, Polarity::Plus));
        assert_eq!(plus.len(), 2, "plus spikes: {:?}", plus);
        assert!(minus.is_empty(), "minus spikes: {:?}", minus);
        let value = enc.decode_interval(plus[1] - plus[0]);
        assert!((value - 0.5).abs() < 0.01, "decoded {}", value);
    }

    #[test]
    fn opposite_signs_cancel_toward_minus() {
        let (plus, minus, enc) = run_adder((0.2, Polarity::Plus), (0.3, Polarity::Minus));
        assert!(plus.is_empty(), "plus spikes: {:?}", plus);
        assert_eq!(minus.len(), 2, "minus spikes: {:?}", minus);
        let value = enc.decode_interval(minus[1] - minus[0]);
        assert!((value - 0.1).abs() < 0.01, "decoded {}", value);
    }

    #[test]
    fn exact_tie_resolves_to_plus_zero() {
        let (plus, minus, enc) = run_adder((0.25, Polarity::Plus), (0.25, Polarity::Minus));
        assert_eq!(plus.len(), 2, "plus spikes: {:?}", plus);
        assert!(minus.is_empty(), "minus spikes: {:?}", minus);
        let value = enc.decode_interval(plus[1] - plus[0]);
        assert!(value.abs() < 0.01, "decoded {}", value);
    }

    #[test]
    fn both_negative_operands() {
        let (plus, minus, enc) = run_adder((0.1, Polarity::Minus), (0.15, Polarity::Minus));
        assert!(plus.is_empty());
        assert_eq!(minus.len(), 2);
        let value = enc.decode_interval(minus[1] - minus[0]);
        assert!((value - 0.25).abs() < 0.01, "decoded {}", value);
    }
}
