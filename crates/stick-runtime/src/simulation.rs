//! Discrete-time simulation of STICK networks
//!
//! The simulator advances every neuron with forward Euler under the
//! four-conductance model, drains due synaptic deliveries before each
//! integration step, and records spikes (and optionally voltages). For a
//! fixed `(network, encoder, dt, triggers)` the logs are a deterministic
//! function of the inputs: neurons are integrated and threshold-checked
//! in uid-lexicographic order, and same-bucket deliveries drain FIFO.

use std::collections::HashMap;

use stick_core::{Channel, Encoder, Network, NeuronParams, NeuronRef};

use crate::error::{Result, RuntimeError};
use crate::events::DeliveryQueue;
use crate::plan::ExecutionPlan;

/// Margin added on top of `Vt` when injecting external trigger spikes
const TRIGGER_MARGIN: f64 = 1e-9;

/// Per-neuron mutable state, owned by the simulator
#[derive(Debug, Clone, Default)]
struct NeuronState {
    v: f64,
    ge: f64,
    gf: f64,
    gate: f64,
    last_spike: Option<f64>,
}

#[derive(Debug, Clone)]
struct OutgoingSynapse {
    target: usize,
    channel: Channel,
    weight: f64,
    delay: f64,
}

/// Flat spike record for export: one spike of one neuron
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpikeRecord {
    /// Spiking neuron
    pub uid: String,
    /// Spike time (ms)
    pub time: f64,
}

/// Flat voltage sample for export
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoltageRecord {
    /// Sampled neuron
    pub uid: String,
    /// Sample time (ms)
    pub time: f64,
    /// Membrane voltage after the step
    pub v: f64,
}

/// Discrete-time STICK simulator borrowing a network read-only
#[derive(Debug)]
pub struct Simulator<'net> {
    network: &'net Network,
    encoder: Encoder,
    dt: f64,
    /// Dense neuron table in uid-lexicographic order
    uids: Vec<NeuronRef>,
    params: Vec<NeuronParams>,
    outgoing: Vec<Vec<OutgoingSynapse>>,
    index: HashMap<String, usize>,
    state: Vec<NeuronState>,
    queue: DeliveryQueue,
    spikes: Vec<Vec<f64>>,
    voltages: Vec<Vec<(f64, f64)>>,
    record_voltage: bool,
    steps_run: u64,
}

impl<'net> Simulator<'net> {
    /// Create a simulator over a network with a given time step (ms)
    pub fn new(network: &'net Network, encoder: Encoder, dt: f64) -> Result<Self> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(RuntimeError::invalid_parameter(
                "dt",
                dt.to_string(),
                "> 0 and finite",
            ));
        }
        if dt > encoder.tmin() / 100.0 {
            log::warn!(
                "dt = {}ms exceeds Tmin/100 = {}ms; interval tolerances degrade",
                dt,
                encoder.tmin() / 100.0
            );
        }

        let mut neurons = network.all_neurons();
        neurons.sort_by(|a, b| a.uid().cmp(b.uid()));

        let mut index = HashMap::with_capacity(neurons.len());
        for (i, neuron) in neurons.iter().enumerate() {
            if index.insert(neuron.uid().to_string(), i).is_some() {
                return Err(RuntimeError::duplicate_uid(neuron.uid()));
            }
        }

        let uids: Vec<NeuronRef> = neurons.iter().map(|n| n.handle()).collect();
        let params: Vec<NeuronParams> = neurons.iter().map(|n| n.params().clone()).collect();

        let mut outgoing: Vec<Vec<OutgoingSynapse>> = vec![Vec::new(); neurons.len()];
        for synapse in network.all_synapses() {
            let source = *index
                .get(synapse.source.uid())
                .ok_or_else(|| RuntimeError::neuron_not_found(synapse.source.uid()))?;
            let target = *index
                .get(synapse.target.uid())
                .ok_or_else(|| RuntimeError::neuron_not_found(synapse.target.uid()))?;
            outgoing[source].push(OutgoingSynapse {
                target,
                channel: synapse.channel,
                weight: synapse.weight,
                delay: synapse.delay,
            });
        }

        let count = neurons.len();
        Ok(Self {
            network,
            encoder,
            dt,
            uids,
            params,
            outgoing,
            index,
            state: vec![NeuronState::default(); count],
            queue: DeliveryQueue::new(),
            spikes: vec![Vec::new(); count],
            voltages: vec![Vec::new(); count],
            record_voltage: false,
            steps_run: 0,
        })
    }

    /// Build a simulator from a compiled plan and register its triggers
    pub fn init_with_plan(plan: &'net ExecutionPlan, encoder: Encoder, dt: f64) -> Result<Self> {
        let mut sim = Self::new(&plan.network, encoder, dt)?;
        for trigger in &plan.triggers {
            sim.apply_input_value(trigger.value, &trigger.target, trigger.t0)?;
        }
        Ok(sim)
    }

    /// Enable or disable full voltage-trace recording (expensive)
    pub fn with_voltage_recording(mut self, enabled: bool) -> Self {
        self.record_voltage = enabled;
        self
    }

    /// Schedule the external spike pair encoding `value` onto a neuron.
    ///
    /// Two threshold-crossing voltage jumps are queued at `t0` and
    /// `t0 + interval(value)`, producing two spikes separated by the
    /// encoded interval.
    pub fn apply_input_value(&mut self, value: f64, neuron: &NeuronRef, t0: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&value) {
            return Err(RuntimeError::invalid_parameter(
                "value",
                value.to_string(),
                "in [0, 1]",
            ));
        }
        let idx = *self
            .index
            .get(neuron.uid())
            .ok_or_else(|| RuntimeError::neuron_not_found(neuron.uid()))?;
        let kick = self.params[idx].vt + TRIGGER_MARGIN;
        self.queue.push(t0, idx, Channel::V, kick);
        self.queue
            .push(t0 + self.encoder.encode_interval(value), idx, Channel::V, kick);
        Ok(())
    }

    /// Advance one `dt` step
    pub fn step(&mut self) -> Result<()> {
        let t = self.steps_run as f64 * self.dt;

        // Deliveries due this step take effect before integration.
        // The half-step slack absorbs float rounding in delay sums.
        let deadline = t + 0.5 * self.dt;
        while let Some(ev) = self.queue.pop_due(deadline) {
            let st = &mut self.state[ev.target];
            match ev.channel {
                Channel::V => st.v += ev.weight,
                Channel::Ge => st.ge += ev.weight,
                Channel::Gf => st.gf += ev.weight,
                Channel::Gate => st.gate += ev.weight,
            }
        }

        // Forward Euler: V first (using the pre-decay gf), then gf decay.
        for i in 0..self.state.len() {
            let p = &self.params[i];
            let st = &mut self.state[i];
            st.v += self.dt * (st.ge + st.gate * st.gf) / p.tm;
            st.gf -= self.dt * st.gf / p.tf;
            if !st.v.is_finite() {
                return Err(RuntimeError::diverged(self.uids[i].uid(), t));
            }
        }

        // Threshold pass in uid order; effects propagate via the queue,
        // so same-step crossings cannot influence each other.
        for i in 0..self.state.len() {
            if self.state[i].v >= self.params[i].vt {
                self.spikes[i].push(t);
                for syn in &self.outgoing[i] {
                    self.queue
                        .push(t + syn.delay, syn.target, syn.channel, syn.weight);
                }
                let st = &mut self.state[i];
                st.v = 0.0;
                st.ge = 0.0;
                st.gf = 0.0;
                st.gate = 0.0;
                st.last_spike = Some(t);
            }
        }

        if self.record_voltage {
            for i in 0..self.state.len() {
                self.voltages[i].push((t, self.state[i].v));
            }
        }

        self.steps_run += 1;
        Ok(())
    }

    /// Advance until simulated time reaches `simulation_time` (ms).
    ///
    /// Runs `floor(simulation_time / dt)` steps from time zero; calling
    /// again with a larger target resumes where the last call stopped.
    /// On divergence the partial logs remain accessible.
    pub fn simulate(&mut self, simulation_time: f64) -> Result<()> {
        if !(simulation_time >= 0.0) {
            return Err(RuntimeError::invalid_parameter(
                "simulation_time",
                simulation_time.to_string(),
                ">= 0",
            ));
        }
        let target_steps = (simulation_time / self.dt).floor() as u64;
        log::info!(
            "simulating {} neurons for {}ms ({} steps of {}ms)",
            self.state.len(),
            simulation_time,
            target_steps,
            self.dt
        );
        while self.steps_run < target_steps {
            self.step()?;
        }
        log::debug!(
            "simulation reached {}ms with {} spikes, {} deliveries pending",
            self.time(),
            self.total_spikes(),
            self.queue.len()
        );
        Ok(())
    }

    /// Current simulated time (ms)
    pub fn time(&self) -> f64 {
        self.steps_run as f64 * self.dt
    }

    /// Steps executed so far
    pub fn steps_run(&self) -> u64 {
        self.steps_run
    }

    /// Time step (ms)
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// The shared interval encoder
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// The network under simulation
    pub fn network(&self) -> &'net Network {
        self.network
    }

    /// Number of neurons under simulation
    pub fn neuron_count(&self) -> usize {
        self.state.len()
    }

    /// Spike times of a neuron, ascending; `None` for unknown uids
    pub fn spike_times(&self, uid: &str) -> Option<&[f64]> {
        self.index.get(uid).map(|&i| self.spikes[i].as_slice())
    }

    /// Voltage trace of a neuron; empty unless recording was enabled
    pub fn voltage_trace(&self, uid: &str) -> Option<&[(f64, f64)]> {
        self.index.get(uid).map(|&i| self.voltages[i].as_slice())
    }

    /// Current `(V, ge, gf, gate)` of a neuron
    pub fn neuron_state(&self, uid: &str) -> Option<(f64, f64, f64, f64)> {
        self.index
            .get(uid)
            .map(|&i| {
                let st = &self.state[i];
                (st.v, st.ge, st.gf, st.gate)
            })
    }

    /// Last spike time of a neuron, if it spiked
    pub fn last_spike(&self, uid: &str) -> Option<f64> {
        self.index.get(uid).and_then(|&i| self.state[i].last_spike)
    }

    /// Total spikes recorded so far
    pub fn total_spikes(&self) -> usize {
        self.spikes.iter().map(Vec::len).sum()
    }

    /// Flat spike records ordered by `(time, uid)`
    pub fn export_spikes(&self) -> Vec<SpikeRecord> {
        let mut records: Vec<SpikeRecord> = self
            .spikes
            .iter()
            .enumerate()
            .flat_map(|(i, times)| {
                let uid = self.uids[i].uid();
                times.iter().map(move |&time| SpikeRecord {
                    uid: uid.to_string(),
                    time,
                })
            })
            .collect();
        records.sort_by(|a, b| a.time.total_cmp(&b.time).then_with(|| a.uid.cmp(&b.uid)));
        records
    }

    /// Flat voltage records ordered by `(time, uid)`
    pub fn export_voltages(&self) -> Vec<VoltageRecord> {
        let mut records: Vec<VoltageRecord> = self
            .voltages
            .iter()
            .enumerate()
            .flat_map(|(i, samples)| {
                let uid = self.uids[i].uid();
                samples.iter().map(move |&(time, v)| VoltageRecord {
                    uid: uid.to_string(),
                    time,
                    v,
                })
            })
            .collect();
        records.sort_by(|a, b| a.time.total_cmp(&b.time).then_with(|| a.uid.cmp(&b.uid)));
        records
    }
}
