//! Signed, normalised multiplier circuit

use stick_core::{Channel, Encoder, Network, NeuronHeader, NeuronParams};

use crate::{CompilerError, Result};

use super::{build_spike_splitter, check_encoder_spacing, CircuitWeights, T_SYN};

/// Fraction of `Tcod` used as the fast time constant of the log/exp
/// stages. Smaller values widen the representable product range
/// (`z ≥ e^(-Tcod/tf)`) at the cost of steeper timing.
const LOG_TF_RATIO: f64 = 0.1;

/// Signed multiplication `z = x·y·norm` on normalised magnitudes.
///
/// Magnitudes go through the log/exp identity: each operand is stored as
/// a charge `Vt·x`, read out through the gated fast-conductance pathway
/// (firing after `-tf·ln(x)`), and the two log intervals are chained
/// back-to-back into one gate window on an exponential accumulator. The
/// window is shortened by `tf·ln(norm)`, so the final linear readout
/// fires after `Tcod·x·y·norm`. Signs resolve XOR-style: four pair
/// detectors on the operand polarities enable either the same-sign or
/// the opposite-sign output and pre-charge the other down.
///
/// Zero magnitudes are not representable in the log domain: such inputs
/// stall the pipeline and the computation reports as undecodable.
/// Products above `1` saturate at full range.
#[derive(Debug)]
pub struct SignedMultiplierNormNetwork {
    network: Network,
    input_a: NeuronHeader,
    input_b: NeuronHeader,
    output: NeuronHeader,
}

impl SignedMultiplierNormNetwork {
    /// Build a multiplier under the given instance path.
    ///
    /// `norm` is the de-normalisation constant of the surrounding
    /// computation (`max_range`); the product of two values scaled by
    /// `1/norm` must be re-scaled by `norm` to stay on the shared scale.
    pub fn build(
        path: &str,
        encoder: &Encoder,
        params: &NeuronParams,
        norm: f64,
    ) -> Result<Self> {
        check_encoder_spacing(encoder)?;
        if !(norm > 0.0) || !norm.is_finite() {
            return Err(CompilerError::InvalidNorm {
                norm,
                reason: "must be positive and finite".into(),
            });
        }

        let tf_log = encoder.tcod() * LOG_TF_RATIO;
        let log_params = params.with_tf(tf_log)?;
        let w = CircuitWeights::derive(encoder, params);
        let w_log = CircuitWeights::derive(encoder, &log_params);
        let tmin = encoder.tmin();

        // The exp gate opens `tf·ln(norm)` after the nominal window start;
        // a strongly sub-unit norm would need a negative delay.
        let norm_shift = tf_log * norm.ln();
        let open_delay = 3.0 * T_SYN + norm_shift;
        if open_delay < 0.0 {
            return Err(CompilerError::InvalidNorm {
                norm,
                reason: format!("requires gate-open delay {}ms < 0", open_delay),
            });
        }

        let mut net = Network::named(path);

        let a_plus = net.create_neuron("a_plus", params.clone())?;
        let a_minus = net.create_neuron("a_minus", params.clone())?;
        let b_plus = net.create_neuron("b_plus", params.clone())?;
        let b_minus = net.create_neuron("b_minus", params.clone())?;

        let mem_a = net.create_neuron("mem_a", log_params.clone())?;
        let mem_b = net.create_neuron("mem_b", log_params.clone())?;
        let expo = net.create_neuron("expo", log_params.clone())?;
        let sync = net.create_neuron("sync", params.clone())?;

        let pair_pp = net.create_neuron("pair_pp", params.clone())?;
        let pair_mm = net.create_neuron("pair_mm", params.clone())?;
        let pair_pm = net.create_neuron("pair_pm", params.clone())?;
        let pair_mp = net.create_neuron("pair_mp", params.clone())?;
        let sign_same = net.create_neuron("sign_same", params.clone())?;
        let sign_diff = net.create_neuron("sign_diff", params.clone())?;

        let out_plus = net.create_neuron("out_plus", params.clone())?;
        let out_minus = net.create_neuron("out_minus", params.clone())?;

        // Magnitude memories: full-scale charge Vt·|x| regardless of the
        // operand's polarity; signs are handled by the pair detectors.
        let lanes = [
            (&a_plus, "a_plus", &mem_a),
            (&a_minus, "a_minus", &mem_a),
            (&b_plus, "b_plus", &mem_b),
            (&b_minus, "b_minus", &mem_b),
        ];
        let mut firsts = Vec::with_capacity(4);
        for (input, tag, mem) in lanes {
            let (first, last) = build_spike_splitter(&mut net, input, tag, params, &w)?;
            net.connect(&first, mem, Channel::Ge, w.wacc, T_SYN + tmin)?;
            net.connect(&last, mem, Channel::Ge, -w.wacc, T_SYN)?;
            net.connect(&last, &sync, Channel::V, w.we / 2.0, T_SYN)?;
            firsts.push(first);
        }

        // Chained log readouts: mem_a fires -tf·ln(xa) after its gate
        // opens, then hands the gate to mem_b.
        net.connect(&sync, &mem_a, Channel::Gf, w_log.gmult, T_SYN)?;
        net.connect(&sync, &mem_a, Channel::Gate, 1.0, T_SYN)?;
        net.connect(&mem_a, &mem_b, Channel::Gf, w_log.gmult, T_SYN)?;
        net.connect(&mem_a, &mem_b, Channel::Gate, 1.0, T_SYN)?;

        // Exp stage: the gate window spans both log intervals minus the
        // norm shift, so the remaining headroom is exactly Vt·x·y·norm.
        net.connect(&sync, &expo, Channel::Gf, w_log.gmult, open_delay)?;
        net.connect(&sync, &expo, Channel::Gate, 1.0, open_delay)?;
        net.connect(&mem_b, &expo, Channel::Gate, -1.0, T_SYN)?;
        net.connect(&mem_b, &expo, Channel::Ge, w.wacc, T_SYN)?;

        // Output pairs: mem_b's firing marks the interval start, the exp
        // readout closes it Tmin + z·Tcod later.
        net.connect(&mem_b, &out_plus, Channel::V, w.we, 2.0 * T_SYN)?;
        net.connect(&expo, &out_plus, Channel::V, w.we, T_SYN + tmin)?;
        net.connect(&mem_b, &out_minus, Channel::V, w.we, 2.0 * T_SYN)?;
        net.connect(&expo, &out_minus, Channel::V, w.we, T_SYN + tmin)?;

        // XOR sign resolution over the operand polarities.
        let (a_p_first, a_m_first, b_p_first, b_m_first) =
            (&firsts[0], &firsts[1], &firsts[2], &firsts[3]);
        net.connect(a_p_first, &pair_pp, Channel::V, w.we / 2.0, T_SYN)?;
        net.connect(b_p_first, &pair_pp, Channel::V, w.we / 2.0, T_SYN)?;
        net.connect(a_m_first, &pair_mm, Channel::V, w.we / 2.0, T_SYN)?;
        net.connect(b_m_first, &pair_mm, Channel::V, w.we / 2.0, T_SYN)?;
        net.connect(a_p_first, &pair_pm, Channel::V, w.we / 2.0, T_SYN)?;
        net.connect(b_m_first, &pair_pm, Channel::V, w.we / 2.0, T_SYN)?;
        net.connect(a_m_first, &pair_mp, Channel::V, w.we / 2.0, T_SYN)?;
        net.connect(b_p_first, &pair_mp, Channel::V, w.we / 2.0, T_SYN)?;

        net.connect(&pair_pp, &sign_same, Channel::V, w.we, T_SYN)?;
        net.connect(&pair_mm, &sign_same, Channel::V, w.we, T_SYN)?;
        net.connect(&pair_pm, &sign_diff, Channel::V, w.we, T_SYN)?;
        net.connect(&pair_mp, &sign_diff, Channel::V, w.we, T_SYN)?;

        net.connect(&sign_diff, &out_plus, Channel::V, 2.0 * w.wi, T_SYN)?;
        net.connect(&sign_same, &out_minus, Channel::V, 2.0 * w.wi, T_SYN)?;

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

    fn run_mul(
        a: (f64, Polarity),
        b: (f64, Polarity),
        norm: f64,
    ) -> (Vec<f64>, Vec<f64>, Encoder) {
        let enc = Encoder::default();
        let mul =
            SignedMultiplierNormNetwork::build("mul_0", &enc, &NeuronParams::default(), norm)
                .unwrap();
        let in_a = mul.input_a().clone();
        let in_b = mul.input_b().clone();
        let out = mul.output().clone();
        let net = mul.into_network();

        let mut sim = Simulator::new(&net, enc.clone(), 0.01).unwrap();
        sim.apply_input_value(a.0, in_a.side(a.1), 0.0).unwrap();
        sim.apply_input_value(b.0, in_b.side(b.1), 0.0).unwrap();
        sim.simulate(400.0).unwrap();

        let plus = sim.spike_times(out.plus.uid()).unwrap().to_vec();
        let minus = sim.spike_times(out.minus.uid()).unwrap().to_vec();
        (plus, minus, enc)
    }

    #[test]
    fn rejects_bad_norm() {
        let enc = Encoder::default();
        let params = NeuronParams::default();
        assert!(SignedMultiplierNormNetwork::build("m", &enc, &params, 0.0).is_err());
        assert!(SignedMultiplierNormNetwork::build("m", &enc, &params, -1.0).is_err());
        assert!(SignedMultiplierNormNetwork::build("m", &enc, &params, f64::NAN).is_err());
        assert!(SignedMultiplierNormNetwork::build("m", &enc, &params, 100.0).is_ok());
    }

    #[test]
    fn unit_norm_product() {
        // 0.5 * 0.4 = 0.2 with norm = 1
        let (plus, minus, enc) = run_mul((0.5, Polarity::Plus), (0.4, Polarity::Plus), 1.0);
        assert_eq!(plus.len(), 2, "plus spikes: {:?}", plus);
        assert!(minus.is_empty(), "minus spikes: {:?}", minus);
        let value = enc.decode_interval(plus[1] - plus[0]);
        assert!((value - 0.2).abs() < 0.02, "decoded {}", value);
    }

    #[test]
    fn norm_rescales_product() {
        // (5/100) * (4/100) * 100 = 0.2 on the shared scale
        let (plus, minus, enc) = run_mul((0.05, Polarity::Plus), (0.04, Polarity::Plus), 100.0);
        assert_eq!(plus.len(), 2, "plus spikes: {:?}", plus);
        assert!(minus.is_empty(), "minus spikes: {:?}", minus);
        let value = enc.decode_interval(plus[1] - plus[0]);
        assert!((value - 0.2).abs() < 0.02, "decoded {}", value);
    }

    #[test]
    fn opposite_signs_yield_minus() {
        let (plus, minus, enc) = run_mul((0.5, Polarity::Plus), (0.4, Polarity::Minus), 1.0);
        assert!(plus.is_empty(), "plus spikes: {:?}", plus);
        assert_eq!(minus.len(), 2, "minus spikes: {:?}", minus);
        let value = enc.decode_interval(minus[1] - minus[0]);
        assert!((value - 0.2).abs() < 0.02, "decoded {}", value);
    }

    #[test]
    fn two_negatives_yield_plus() {
        let (plus, minus, enc) = run_mul((0.5, Polarity::Minus), (0.4, Polarity::Minus), 1.0);
        assert_eq!(plus.len(), 2);
        assert!(minus.is_empty());
        let value = enc.decode_interval(plus[1] - plus[0]);
        assert!((value - 0.2).abs() < 0.02, "decoded {}", value);
    }
}
