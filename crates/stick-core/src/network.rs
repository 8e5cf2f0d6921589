//! Hierarchical network modules
//!
//! A [`Network`] owns neurons, synapses, and child modules. Neuron uids
//! are dotted module paths, so uniqueness is structural and reproducible
//! across runs without a global registry: child modules and neurons are
//! enumerated in insertion order.

use crate::error::{CoreError, Result};
use crate::neuron::{Neuron, NeuronParams, NeuronRef};
use crate::synapse::{Channel, Synapse};

/// Hierarchical container of neurons, synapses, and child modules
#[derive(Debug, Clone, Default)]
pub struct Network {
    path: String,
    neurons: Vec<Neuron>,
    synapses: Vec<Synapse>,
    children: Vec<Network>,
}

impl Network {
    /// Create the top-level module. Its neurons get bare local names.
    pub fn root() -> Self {
        Self::default()
    }

    /// Create a module at the given dotted path.
    ///
    /// Subnetworks are built directly with their final instance path
    /// (e.g. `"add_2"`), so attaching them later never rewrites uids and
    /// handles captured at build time stay valid.
    pub fn named(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Dotted path of this module; empty for the root
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Create a neuron in this module and return its handle
    pub fn create_neuron(&mut self, local: &str, params: NeuronParams) -> Result<NeuronRef> {
        params.validate()?;
        let uid = if self.path.is_empty() {
            local.to_string()
        } else {
            format!("{}.{}", self.path, local)
        };
        if self.neurons.iter().any(|n| n.uid() == uid) {
            return Err(CoreError::duplicate_neuron(uid));
        }
        let handle = NeuronRef::new(&uid);
        self.neurons.push(Neuron::new(handle.clone(), params));
        Ok(handle)
    }

    /// Connect two neurons on a channel with weight and delay.
    ///
    /// Both endpoints must already exist somewhere in this module tree.
    pub fn connect(
        &mut self,
        source: &NeuronRef,
        target: &NeuronRef,
        channel: Channel,
        weight: f64,
        delay: f64,
    ) -> Result<()> {
        if !(delay >= 0.0) {
            return Err(CoreError::invalid_parameter(
                "delay",
                delay.to_string(),
                ">= 0",
            ));
        }
        if !weight.is_finite() {
            return Err(CoreError::invalid_parameter(
                "weight",
                weight.to_string(),
                "finite",
            ));
        }
        if !self.contains(source) {
            return Err(CoreError::invalid_parameter(
                "source",
                source.uid().to_string(),
                "an existing neuron",
            ));
        }
        if !self.contains(target) {
            return Err(CoreError::invalid_parameter(
                "target",
                target.uid().to_string(),
                "an existing neuron",
            ));
        }
        self.synapses.push(Synapse::new(
            source.clone(),
            target.clone(),
            channel,
            weight,
            delay,
        ));
        Ok(())
    }

    /// Attach a child module
    pub fn attach(&mut self, child: Network) {
        self.children.push(child);
    }

    /// Whether a neuron with this handle exists in the module tree
    pub fn contains(&self, neuron: &NeuronRef) -> bool {
        self.neurons.iter().any(|n| n.uid() == neuron.uid())
            || self.children.iter().any(|c| c.contains(neuron))
    }

    /// Neurons owned directly by this module
    pub fn own_neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Synapses owned directly by this module
    pub fn own_synapses(&self) -> &[Synapse] {
        &self.synapses
    }

    /// Child modules in insertion order
    pub fn children(&self) -> &[Network] {
        &self.children
    }

    /// All neurons in the module tree, own first, then children in order
    pub fn all_neurons(&self) -> Vec<&Neuron> {
        let mut out: Vec<&Neuron> = self.neurons.iter().collect();
        for child in &self.children {
            out.extend(child.all_neurons());
        }
        out
    }

    /// All synapses in the module tree, own first, then children in order
    pub fn all_synapses(&self) -> Vec<&Synapse> {
        let mut out: Vec<&Synapse> = self.synapses.iter().collect();
        for child in &self.children {
            out.extend(child.all_synapses());
        }
        out
    }

    /// Total neuron count across the module tree
    pub fn neuron_count(&self) -> usize {
        self.neurons.len() + self.children.iter().map(Network::neuron_count).sum::<usize>()
    }

    /// Total synapse count across the module tree
    pub fn synapse_count(&self) -> usize {
        self.synapses.len() + self.children.iter().map(Network::synapse_count).sum::<usize>()
    }
}
