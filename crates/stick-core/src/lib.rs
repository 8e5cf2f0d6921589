//! Network model and interval encoder for the STICK toolkit
//!
//! STICK (Spike Time Interval Computational Kernel) circuits encode a
//! scalar in `[0, 1]` as the interval between two spikes. This crate
//! provides the shared vocabulary of the toolkit: the interval encoder,
//! neuron and synapse descriptors, the four typed synaptic channels, and
//! the hierarchical network modules whose dotted paths double as stable
//! neuron uids.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod encoder;
pub mod error;
pub mod network;
pub mod neuron;
pub mod synapse;

pub use encoder::Encoder;
pub use error::{CoreError, Result};
pub use network::Network;
pub use neuron::{Neuron, NeuronHeader, NeuronParams, NeuronRef, Polarity};
pub use synapse::{Channel, Synapse};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_integration() {
        let enc = Encoder::default();
        assert!(enc.tmin() > 0.0);

        let params = NeuronParams::default();
        assert!(params.vt > 0.0);

        let mut net = Network::root();
        let n = net.create_neuron("n", params).unwrap();
        assert_eq!(n.uid(), "n");
    }
}
