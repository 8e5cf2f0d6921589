//! Compiled execution plans: triggers, output reader, owned network

use stick_core::{Encoder, Network, NeuronHeader, NeuronRef, Polarity};

use crate::error::{Result, RuntimeError};
use crate::simulation::Simulator;

/// External spike-pair injection bound to one input neuron.
///
/// Created at compile time from literal loads; the simulator consumes it
/// as two threshold-crossing voltage jumps at `t0` and
/// `t0 + interval(value)`.
#[derive(Debug, Clone)]
pub struct InputTrigger {
    /// Normalized magnitude in `[0, 1]`
    pub value: f64,
    /// Which side of the input header the magnitude is injected on
    pub polarity: Polarity,
    /// Target neuron (already the chosen polarity of the header)
    pub target: NeuronRef,
    /// Absolute injection time of the first spike (ms)
    pub t0: f64,
}

/// Reads a signed value off an output header after simulation.
#[derive(Debug, Clone)]
pub struct OutputReader {
    /// Plus-side output neuron
    pub plus: NeuronRef,
    /// Minus-side output neuron
    pub minus: NeuronRef,
}

impl OutputReader {
    /// Build a reader over an output header pair
    pub fn new(header: &NeuronHeader) -> Self {
        Self {
            plus: header.plus.clone(),
            minus: header.minus.clone(),
        }
    }

    /// Decode the signed de-normalized value from the spike log.
    ///
    /// Exactly one polarity must have emitted exactly two spikes; that
    /// side fixes the sign and its interval carries the magnitude.
    pub fn decode(&self, sim: &Simulator<'_>, max_range: f64) -> Result<f64> {
        let plus = sim.spike_times(self.plus.uid()).unwrap_or(&[]);
        let minus = sim.spike_times(self.minus.uid()).unwrap_or(&[]);

        let side = match (plus.len() == 2, minus.len() == 2) {
            (true, false) => Polarity::Plus,
            (false, true) => Polarity::Minus,
            _ => {
                return Err(RuntimeError::UndecodableOutput {
                    plus_uid: self.plus.uid().to_string(),
                    plus_count: plus.len(),
                    minus_uid: self.minus.uid().to_string(),
                    minus_count: minus.len(),
                })
            }
        };

        let times = match side {
            Polarity::Plus => plus,
            Polarity::Minus => minus,
        };
        let interval = times[1] - times[0];
        let magnitude = sim.encoder().decode_interval(interval) * max_range;
        Ok(side.sign() * magnitude)
    }
}

/// Compiled artefact: network, input triggers, output reader, and the
/// de-normalization factor. Immutable after compilation.
#[derive(Debug)]
pub struct ExecutionPlan {
    /// Top-level network module
    pub network: Network,
    /// Input triggers for every literal load
    pub triggers: Vec<InputTrigger>,
    /// Reader over the root operation's output header
    pub reader: OutputReader,
    /// De-normalization factor applied on decode
    pub max_range: f64,
}

impl ExecutionPlan {
    /// Create a plan
    pub fn new(
        network: Network,
        triggers: Vec<InputTrigger>,
        reader: OutputReader,
        max_range: f64,
    ) -> Self {
        Self {
            network,
            triggers,
            reader,
            max_range,
        }
    }
}

/// Build a simulator from a plan, run it to `simulation_time`, and
/// decode the output. Convenience driver for the common one-shot case.
pub fn run_plan(
    plan: &ExecutionPlan,
    encoder: &Encoder,
    dt: f64,
    simulation_time: f64,
) -> Result<f64> {
    let mut sim = Simulator::init_with_plan(plan, encoder.clone(), dt)?;
    sim.simulate(simulation_time)?;
    let value = plan.reader.decode(&sim, plan.max_range)?;
    log::info!(
        "plan executed: {} spikes in {} steps, decoded {}",
        sim.total_spikes(),
        sim.steps_run(),
        value
    );
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stick_core::NeuronParams;

    #[test]
    fn test_decode_requires_exactly_one_double_spike_side() {
        let mut net = Network::root();
        let plus = net.create_neuron("out_plus", NeuronParams::default()).unwrap();
        let minus = net.create_neuron("out_minus", NeuronParams::default()).unwrap();
        let reader = OutputReader::new(&NeuronHeader::new(plus.clone(), minus.clone()));

        let enc = Encoder::default();
        let mut sim = Simulator::new(&net, enc.clone(), 0.1).unwrap();
        // Nothing spiked yet: neither side has two spikes.
        let err = reader.decode(&sim, 1.0).unwrap_err();
        assert!(matches!(err, RuntimeError::UndecodableOutput { .. }));

        // Two spikes on plus at Tmin + 0.25 * Tcod apart decode to +0.25.
        sim.apply_input_value(0.25, &plus, 0.0).unwrap();
        sim.simulate(enc.tmax() + 1.0).unwrap();
        let value = reader.decode(&sim, 100.0).unwrap();
        assert!((value - 25.0).abs() < 0.5, "decoded {}", value);
    }
}
