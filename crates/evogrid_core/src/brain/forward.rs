use super::*;

/// Runs the compiled graph once and returns raw action levels.
///
/// Hidden accumulators fill up while the hidden-sink prefix of the
/// connection list is walked. Driven neurons are frozen to
/// `tanh(accumulator)` right before the first action-sink connection, so a
/// single linear pass is enough. Neuron outputs persist into the next call.
pub fn evaluate<F>(brain: &mut CompiledBrain, mut sensor: F) -> Vec<f32>
where
    F: FnMut(usize) -> f32,
{
    let mut accumulators = vec![0.0_f32; brain.neurons.len()];
    let mut levels = vec![0.0_f32; brain.counts.actions];
    let mut frozen = false;

    for (idx, conn) in brain.connections.iter().enumerate() {
        if idx == brain.first_action && !frozen {
            freeze(&mut brain.neurons, &accumulators);
            frozen = true;
        }

        let input = match conn.source_kind {
            SourceKind::Sensor => sensor(usize::from(conn.source_id)),
            SourceKind::Hidden => brain
                .neurons
                .get(usize::from(conn.source_id))
                .map_or(0.0, |n| n.output),
        };
        let value = input * conn.weight_as_f32();

        let target = match conn.sink_kind {
            SinkKind::Hidden => accumulators.get_mut(usize::from(conn.sink_id)),
            SinkKind::Action => levels.get_mut(usize::from(conn.sink_id)),
        };
        if let Some(slot) = target {
            *slot += value;
        }
    }

    if !frozen {
        freeze(&mut brain.neurons, &accumulators);
    }

    levels
}

fn freeze(neurons: &mut [Neuron], accumulators: &[f32]) {
    for (neuron, &acc) in neurons.iter_mut().zip(accumulators) {
        if neuron.driven {
            neuron.output = acc.tanh();
        }
    }
}

/// Resets every neuron to its initial output.
pub fn reset(brain: &mut CompiledBrain) {
    for neuron in &mut brain.neurons {
        neuron.output = INITIAL_NEURON_OUTPUT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn counts() -> NeuronCounts {
        NeuronCounts {
            sensors: 3,
            hidden: 4,
            actions: 2,
        }
    }

    #[test]
    fn test_empty_brain_yields_zero_levels() {
        let mut brain = compile(&Genome::default(), counts());
        let levels = evaluate(&mut brain, |_| 1.0);
        assert_eq!(levels, vec![0.0, 0.0]);
    }

    #[test]
    fn test_direct_sensor_to_action() {
        let genome = Genome::from_genes(vec![Gene::new(
            SourceKind::Sensor,
            1,
            SinkKind::Action,
            0,
            6554,
        )]);
        let mut brain = compile(&genome, counts());
        let levels = evaluate(&mut brain, |id| if id == 1 { 2.0 } else { 0.0 });
        assert!((levels[0] - 2.0 * 6554.0 / 6553.6).abs() < 1e-4);
        assert_eq!(levels[1], 0.0);
    }

    #[test]
    fn test_hidden_output_frozen_before_actions() {
        // s0 -> h0 (w=1.0), h0 -> a1 (w=1.0)
        let genome = Genome::from_genes(vec![
            Gene::new(SourceKind::Hidden, 0, SinkKind::Action, 1, 6554),
            Gene::new(SourceKind::Sensor, 0, SinkKind::Hidden, 0, 6554),
        ]);
        let mut brain = compile(&genome, counts());
        let levels = evaluate(&mut brain, |_| 0.5);

        let w = 6554.0 / 6553.6_f32;
        let hidden = (0.5 * w).tanh();
        assert!((brain.neurons[0].output - hidden).abs() < 1e-6);
        assert!((levels[1] - hidden * w).abs() < 1e-5);
    }

    #[test]
    fn test_undriven_neuron_keeps_initial_output() {
        let genome = Genome::from_genes(vec![Gene::new(
            SourceKind::Hidden,
            2,
            SinkKind::Action,
            0,
            6554,
        )]);
        let mut brain = compile(&genome, counts());
        for _ in 0..3 {
            let levels = evaluate(&mut brain, |_| 1.0);
            assert!((levels[0] - INITIAL_NEURON_OUTPUT * 6554.0 / 6553.6).abs() < 1e-5);
        }
        assert_eq!(brain.neurons[0].output, INITIAL_NEURON_OUTPUT);
    }

    #[test]
    fn test_evaluation_is_pure_for_fresh_brains() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..20 {
            let genome = Genome::new_random_with_rng(12, counts(), &mut rng);
            let sensors = [0.2, -0.7, 0.9];
            let a = evaluate(&mut compile(&genome, counts()), |i| sensors[i]);
            let b = evaluate(&mut compile(&genome, counts()), |i| sensors[i]);
            assert_eq!(a, b);
            assert!(a.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_reset_restores_initial_outputs() {
        let genome = Genome::from_genes(vec![
            Gene::new(SourceKind::Sensor, 0, SinkKind::Hidden, 1, 20000),
            Gene::new(SourceKind::Hidden, 1, SinkKind::Action, 0, 100),
        ]);
        let mut brain = compile(&genome, counts());
        let _ = evaluate(&mut brain, |_| 1.0);
        assert_ne!(brain.neurons[0].output, INITIAL_NEURON_OUTPUT);
        reset(&mut brain);
        assert_eq!(brain.neurons[0].output, INITIAL_NEURON_OUTPUT);
    }
}
