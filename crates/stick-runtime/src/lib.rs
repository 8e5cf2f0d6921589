//! Discrete-time runtime engine for STICK networks
//!
//! Consumes the network model from `stick-core` and advances it with a
//! fixed-step, event-aware integration loop. Determinism is a first-class
//! property: identical `(network, encoder, dt, triggers, duration)`
//! produce bitwise-identical spike and voltage logs. The engine is
//! single-threaded and synchronous; cancellation is cooperative via
//! [`Simulator::step`].

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod plan;
pub mod simulation;

mod events;

pub use error::{Result, RuntimeError};
pub use plan::{run_plan, ExecutionPlan, InputTrigger, OutputReader};
pub use simulation::{Simulator, SpikeRecord, VoltageRecord};

// Re-export the model types the runtime API is expressed in
pub use stick_core::{Channel, Encoder, Network, NeuronHeader, NeuronParams, NeuronRef, Polarity};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_integration() {
        let mut net = Network::root();
        let n = net.create_neuron("n", NeuronParams::default()).unwrap();
        let mut sim = Simulator::new(&net, Encoder::default(), 0.01).unwrap();
        sim.apply_input_value(0.0, &n, 0.0).unwrap();
        sim.simulate(20.0).unwrap();
        assert_eq!(sim.spike_times("n").map(<[f64]>::len), Some(2));
    }
}
