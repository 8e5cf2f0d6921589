//! Sign flipper circuit: unary negation

use stick_core::{Channel, Network, NeuronHeader, NeuronParams};

use crate::Result;

use super::T_SYN;

/// Negation by polarity swap.
///
/// The output plus header relays the timing of the input minus and vice
/// versa; both spikes shift by the same fabric delay, so the interval
/// (and with it the magnitude) is preserved exactly.
#[derive(Debug)]
pub struct SignFlipperNetwork {
    network: Network,
    input: NeuronHeader,
    output: NeuronHeader,
}

impl SignFlipperNetwork {
    /// Build a sign flipper under the given instance path
    pub fn build(path: &str, params: &NeuronParams) -> Result<Self> {
        let we = params.vt;
        let mut network = Network::named(path);
        let in_plus = network.create_neuron("in_plus", params.clone())?;
        let in_minus = network.create_neuron("in_minus", params.clone())?;
        let out_plus = network.create_neuron("out_plus", params.clone())?;
        let out_minus = network.create_neuron("out_minus", params.clone())?;

        network.connect(&in_plus, &out_minus, Channel::V, we, T_SYN)?;
        network.connect(&in_minus, &out_plus, Channel::V, we, T_SYN)?;

        Ok(Self {
            network,
            input: NeuronHeader::new(in_plus, in_minus),
            output: NeuronHeader::new(out_plus, out_minus),
        })
    }

    /// Input header pair
    pub fn input(&self) -> &NeuronHeader {
        &self.input
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
    use stick_core::Encoder;
    use stick_runtime::Simulator;

    #[test]
    fn polarity_swap_preserves_interval() {
        let flip = SignFlipperNetwork::build("neg_0", &NeuronParams::default()).unwrap();
        let input = flip.input().clone();
        let output = flip.output().clone();
        let net = flip.into_network();

        let enc = Encoder::default();
        let mut sim = Simulator::new(&net, enc.clone(), 0.01).unwrap();
        sim.apply_input_value(0.3, &input.plus, 0.0).unwrap();
        sim.simulate(100.0).unwrap();

        let out_minus = sim.spike_times(output.minus.uid()).unwrap();
        assert_eq!(out_minus.len(), 2);
        let interval = out_minus[1] - out_minus[0];
        assert!((interval - enc.encode_interval(0.3)).abs() < 0.03);
        assert!(sim.spike_times(output.plus.uid()).unwrap().is_empty());
    }
}
