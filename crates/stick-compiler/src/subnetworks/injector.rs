//! Injector circuit: entry point for literal loads

use stick_core::{Network, NeuronHeader, NeuronParams};

use crate::Result;

/// Entry circuit for one literal value.
///
/// The two neurons receive the external trigger pair on the polarity
/// matching the literal's sign and re-emit the same interval downstream.
/// One header pair only; it serves as the `out` plug.
#[derive(Debug)]
pub struct InjectorNetwork {
    network: Network,
    output: NeuronHeader,
}

impl InjectorNetwork {
    /// Build an injector under the given instance path
    pub fn build(path: &str, params: &NeuronParams) -> Result<Self> {
        let mut network = Network::named(path);
        let plus = network.create_neuron("plus", params.clone())?;
        let minus = network.create_neuron("minus", params.clone())?;
        Ok(Self {
            network,
            output: NeuronHeader::new(plus, minus),
        })
    }

    /// Output header pair (also the external trigger target)
    pub fn output(&self) -> &NeuronHeader {
        &self.output
    }

    /// Consume the builder, yielding the module for attachment
    pub fn into_network(self) -> Network {
        self.network
    }
}
