#![doc = "STICK compiler — lowering of symbolic scalar expressions to spiking execution plans.\n\nPublic responsibilities:\n- Subnetwork library: pre-designed circuits for Load, Neg, Add, Mul plus the exp/log primitives\n- Flattening: delegate to stick-ir for the deduplicated topological operation list\n- Lowering (compile_computation): spawn one subnetwork per operation, bind plugs to header pairs,\n  attach every instance under the top module with ordinal names, wire producer/consumer headers\n  with paired V synapses, emit input triggers for literals and the output reader for the root\n\nKey concepts:\n- OpScaffold: compilation intermediate bound to one DAG node, mapping logical plugs to the\n  instantiated subnetwork's header pairs\n- Connection: wiring directive between a producer's out plug and a consumer's input plug\n- Determinism: the same DAG lowers to identical uids, wiring, and plan on every run\n\nIntegration points:\n- stick-ir: expression DAG and flattening\n- stick-runtime: ExecutionPlan, InputTrigger, OutputReader consumed by the simulator\n"]
#![deny(missing_docs)]

use std::collections::HashMap;

use stick_core::{Channel, Encoder, Network, NeuronHeader, NeuronParams, Polarity};
use stick_ir::{flatten, OpKind, Scalar};
use stick_runtime::{ExecutionPlan, InputTrigger, OutputReader};

pub mod subnetworks;

use subnetworks::{
    AdderNetwork, InjectorNetwork, SignFlipperNetwork, SignedMultiplierNormNetwork, T_SYN,
};

/// Compiler error type
#[derive(thiserror::Error, Debug)]
pub enum CompilerError {
    /// Expression error from the IR layer
    #[error("IR error: {0}")]
    Ir(#[from] stick_ir::IrError),

    /// Network-model error during subnetwork construction or wiring
    #[error("Network model error: {0}")]
    Core(#[from] stick_core::CoreError),

    /// A literal load exceeds the computation's value range
    #[error("Load value {value} exceeds max_range {max_range}")]
    RangeError {
        /// Offending literal value
        value: f64,
        /// Configured range
        max_range: f64,
    },

    /// Unusable normalisation constant
    #[error("Invalid norm {norm}: {reason}")]
    InvalidNorm {
        /// Offending constant
        norm: f64,
        /// Why it is rejected
        reason: String,
    },

    /// A scaffold is missing a plug the wiring step needs
    #[error("Scaffold {scaffold} has no {plug:?} plug")]
    MissingPlug {
        /// Scaffold instance path
        scaffold: String,
        /// Requested plug
        plug: Plug,
    },

    /// Generic error
    #[error("{0}")]
    Message(String),
}

/// Result alias for compiler operations
pub type Result<T> = std::result::Result<T, CompilerError>;

/// Named logical port on an operation scaffold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Plug {
    /// Single input of a unary operation
    In,
    /// First input of a binary operation
    InA,
    /// Second input of a binary operation
    InB,
    /// Output
    Out,
}

/// Input plug schema of an operation kind
pub fn input_plugs(kind: OpKind) -> &'static [Plug] {
    match kind {
        OpKind::Load => &[],
        OpKind::Neg => &[Plug::In],
        OpKind::Add | OpKind::Mul => &[Plug::InA, Plug::InB],
    }
}

/// Compilation intermediate bound to one DAG node: the operation kind,
/// the instance path of its subnetwork, and the mapping from logical
/// plugs to instantiated header pairs.
#[derive(Debug)]
pub struct OpScaffold {
    kind: OpKind,
    path: String,
    plugs: HashMap<Plug, NeuronHeader>,
}

impl OpScaffold {
    /// Operation kind
    pub fn kind(&self) -> OpKind {
        self.kind
    }

    /// Instance path of the subnetwork under the top module
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Header pair bound to a plug, if the schema has it
    pub fn plug(&self, plug: Plug) -> Option<&NeuronHeader> {
        self.plugs.get(&plug)
    }

    fn require(&self, plug: Plug) -> Result<&NeuronHeader> {
        self.plug(plug).ok_or_else(|| CompilerError::MissingPlug {
            scaffold: self.path.clone(),
            plug,
        })
    }
}

/// Wiring directive between two scaffolds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    /// Producer scaffold ordinal
    pub source: usize,
    /// Producer plug, always [`Plug::Out`]
    pub source_plug: Plug,
    /// Consumer scaffold ordinal
    pub target: usize,
    /// Consumer input plug
    pub target_plug: Plug,
}

/// Shared parameters of one compilation
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Interval encoder all subnetworks are parameterised by
    pub encoder: Encoder,
    /// Neuron parameters used across the fabric
    pub params: NeuronParams,
    /// Absolute injection time of the input triggers (ms)
    pub t0: f64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            encoder: Encoder::default(),
            params: NeuronParams::default(),
            t0: 0.0,
        }
    }
}

/// Compile a scalar expression into an execution plan with default
/// encoder, neuron parameters, and `t0 = 0`.
pub fn compile_computation(root: &Scalar, max_range: f64) -> Result<ExecutionPlan> {
    compile_with(root, max_range, &CompilerConfig::default())
}

/// Compile a scalar expression into an execution plan.
///
/// The pipeline flattens the DAG, spawns one subnetwork per distinct
/// node (named by kind and ordinal), wires producer and consumer headers
/// with paired `V` synapses of weight `Vt` and delay `Tsyn`, emits one
/// input trigger per literal load, and builds the output reader over the
/// root's out header. The result is deterministic for a given DAG.
pub fn compile_with(
    root: &Scalar,
    max_range: f64,
    config: &CompilerConfig,
) -> Result<ExecutionPlan> {
    if !(max_range > 0.0) || !max_range.is_finite() {
        return Err(CompilerError::InvalidNorm {
            norm: max_range,
            reason: "max_range must be positive and finite".into(),
        });
    }

    let graph = flatten(root)?;
    let mut top = Network::root();
    let mut scaffolds: Vec<OpScaffold> = Vec::with_capacity(graph.len());

    // Spawn, fill, instantiate: one subnetwork per operation, attached
    // under the top module with the scaffold ordinal in its name.
    for (ordinal, node) in graph.nodes.iter().enumerate() {
        let path = format!("{}_{}", node.kind, ordinal);
        let mut plugs = HashMap::new();
        match node.kind {
            OpKind::Load => {
                let injector = InjectorNetwork::build(&path, &config.params)?;
                plugs.insert(Plug::Out, injector.output().clone());
                top.attach(injector.into_network());
            }
            OpKind::Neg => {
                let flipper = SignFlipperNetwork::build(&path, &config.params)?;
                plugs.insert(Plug::In, flipper.input().clone());
                plugs.insert(Plug::Out, flipper.output().clone());
                top.attach(flipper.into_network());
            }
            OpKind::Add => {
                let adder = AdderNetwork::build(&path, &config.encoder, &config.params)?;
                plugs.insert(Plug::InA, adder.input_a().clone());
                plugs.insert(Plug::InB, adder.input_b().clone());
                plugs.insert(Plug::Out, adder.output().clone());
                top.attach(adder.into_network());
            }
            OpKind::Mul => {
                let mul = SignedMultiplierNormNetwork::build(
                    &path,
                    &config.encoder,
                    &config.params,
                    max_range,
                )?;
                plugs.insert(Plug::InA, mul.input_a().clone());
                plugs.insert(Plug::InB, mul.input_b().clone());
                plugs.insert(Plug::Out, mul.output().clone());
                top.attach(mul.into_network());
            }
        }
        scaffolds.push(OpScaffold {
            kind: node.kind,
            path,
            plugs,
        });
    }

    // Connections from the flattened operand edges.
    let mut connections: Vec<Connection> = Vec::new();
    for (ordinal, node) in graph.nodes.iter().enumerate() {
        for (slot, &operand) in node.operands.iter().enumerate() {
            connections.push(Connection {
                source: operand,
                source_plug: Plug::Out,
                target: ordinal,
                target_plug: input_plugs(node.kind)[slot],
            });
        }
    }

    // Wire: both polarities cross the module boundary together, so the
    // signed interval coding survives every hop.
    let we = config.params.vt;
    for conn in &connections {
        let producer = scaffolds[conn.source].require(conn.source_plug)?;
        let consumer = scaffolds[conn.target].require(conn.target_plug)?;
        top.connect(&producer.plus, &consumer.plus, Channel::V, we, T_SYN)?;
        top.connect(&producer.minus, &consumer.minus, Channel::V, we, T_SYN)?;
    }

    // Triggers: one external spike pair per literal, injected on the
    // polarity matching the literal's sign.
    let mut triggers: Vec<InputTrigger> = Vec::new();
    for (ordinal, node) in graph.nodes.iter().enumerate() {
        if node.kind != OpKind::Load {
            continue;
        }
        let raw = node.value.ok_or_else(|| {
            CompilerError::Message(format!("load node {} has no literal value", ordinal))
        })?;
        let magnitude = raw.abs() / max_range;
        if magnitude > 1.0 {
            return Err(CompilerError::RangeError {
                value: raw,
                max_range,
            });
        }
        let polarity = if raw >= 0.0 {
            Polarity::Plus
        } else {
            Polarity::Minus
        };
        let target = scaffolds[ordinal].require(Plug::Out)?.side(polarity).clone();
        triggers.push(InputTrigger {
            value: magnitude,
            polarity,
            target,
            t0: config.t0,
        });
    }

    let reader = OutputReader::new(scaffolds[graph.root()].require(Plug::Out)?);

    log::debug!(
        "lowered {} ops into {} neurons, {} synapses, {} triggers",
        scaffolds.len(),
        top.neuron_count(),
        top.synapse_count(),
        triggers.len()
    );

    Ok(ExecutionPlan::new(top, triggers, reader, max_range))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uids_of(plan: &ExecutionPlan) -> Vec<String> {
        plan.network
            .all_neurons()
            .iter()
            .map(|n| n.uid().to_string())
            .collect()
    }

    #[test]
    fn compile_single_load() {
        let plan = compile_computation(&Scalar::new(50.0), 100.0).expect("compile");
        assert_eq!(plan.triggers.len(), 1);
        assert_eq!(plan.triggers[0].value, 0.5);
        assert_eq!(plan.triggers[0].polarity, Polarity::Plus);
        assert_eq!(plan.reader.plus.uid(), "load_0.plus");
        assert_eq!(plan.reader.minus.uid(), "load_0.minus");
    }

    #[test]
    fn negative_load_targets_minus_side() {
        let plan = compile_computation(&Scalar::new(-7.0), 100.0).expect("compile");
        assert_eq!(plan.triggers.len(), 1);
        assert_eq!(plan.triggers[0].polarity, Polarity::Minus);
        assert_eq!(plan.triggers[0].target.uid(), "load_0.minus");
    }

    #[test]
    fn negation_wraps_a_positive_load() {
        let plan = compile_computation(&-Scalar::new(7.0), 100.0).expect("compile");
        // The literal itself is positive; the sign flip happens in the
        // network, so the trigger still lands on the plus side.
        assert_eq!(plan.triggers[0].polarity, Polarity::Plus);
        assert_eq!(plan.reader.plus.uid(), "neg_1.out_plus");
        assert_eq!(plan.reader.minus.uid(), "neg_1.out_minus");
    }

    #[test]
    fn range_error_on_oversized_load() {
        let expr = Scalar::new(101.0) + Scalar::new(1.0);
        let err = compile_computation(&expr, 100.0).unwrap_err();
        assert!(matches!(err, CompilerError::RangeError { .. }));
    }

    #[test]
    fn load_exactly_at_max_range_is_accepted() {
        let plan = compile_computation(&Scalar::new(100.0), 100.0).expect("compile");
        assert_eq!(plan.triggers[0].value, 1.0);
    }

    #[test]
    fn shared_subexpression_instantiated_once() {
        let shared = Scalar::new(2.0) + Scalar::new(3.0);
        let expr = &shared * &shared;
        let plan = compile_computation(&expr, 100.0).expect("compile");
        // load_0, load_1, add_2, mul_3: the shared add spawns once.
        assert_eq!(plan.network.children().len(), 4);
        let add_children: Vec<_> = plan
            .network
            .children()
            .iter()
            .filter(|c| c.path().starts_with("add"))
            .collect();
        assert_eq!(add_children.len(), 1);
    }

    #[test]
    fn every_uid_is_unique() {
        let expr = (Scalar::new(2.0) + Scalar::new(3.0)) * Scalar::new(4.0);
        let plan = compile_computation(&expr, 100.0).expect("compile");
        let mut uids = uids_of(&plan);
        let total = uids.len();
        uids.sort();
        uids.dedup();
        assert_eq!(uids.len(), total);
    }

    #[test]
    fn compilation_is_deterministic() {
        let build = || {
            let expr = (Scalar::new(2.0) - Scalar::new(3.0)) * Scalar::new(4.0);
            compile_computation(&expr, 100.0).expect("compile")
        };
        let a = build();
        let b = build();
        assert_eq!(uids_of(&a), uids_of(&b));
        assert_eq!(a.network.synapse_count(), b.network.synapse_count());
        assert_eq!(a.triggers.len(), b.triggers.len());
        for (ta, tb) in a.triggers.iter().zip(&b.triggers) {
            assert_eq!(ta.target.uid(), tb.target.uid());
            assert_eq!(ta.value, tb.value);
        }
    }

    #[test]
    fn invalid_max_range_rejected() {
        let expr = Scalar::new(1.0);
        assert!(matches!(
            compile_computation(&expr, 0.0),
            Err(CompilerError::InvalidNorm { .. })
        ));
        assert!(matches!(
            compile_computation(&expr, f64::NAN),
            Err(CompilerError::InvalidNorm { .. })
        ));
    }

    #[test]
    fn plug_schema() {
        assert!(input_plugs(OpKind::Load).is_empty());
        assert_eq!(input_plugs(OpKind::Neg), &[Plug::In]);
        assert_eq!(input_plugs(OpKind::Add), &[Plug::InA, Plug::InB]);
        assert_eq!(input_plugs(OpKind::Mul), &[Plug::InA, Plug::InB]);
    }
}
