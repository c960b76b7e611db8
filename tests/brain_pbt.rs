use evogrid_core::brain::{GenomeLogic, NeuronCounts, SENSOR_COUNT};
use evogrid_data::{Gene, Genome, SinkKind, SourceKind};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Raw ids span the full u16 range so normalization is always exercised.
prop_compose! {
    fn arb_gene()(
        source_hidden in any::<bool>(),
        source_id in any::<u16>(),
        sink_hidden in any::<bool>(),
        sink_id in any::<u16>(),
        weight in any::<i16>()
    ) -> Gene {
        Gene::new(
            if source_hidden { SourceKind::Hidden } else { SourceKind::Sensor },
            source_id,
            if sink_hidden { SinkKind::Hidden } else { SinkKind::Action },
            sink_id,
            weight,
        )
    }
}

prop_compose! {
    fn arb_genome(max_genes: usize)(
        genes in prop::collection::vec(arb_gene(), 0..max_genes)
    ) -> Genome {
        Genome::from_genes(genes)
    }
}

prop_compose! {
    fn arb_counts()(hidden in 1usize..8) -> NeuronCounts {
        NeuronCounts::with_hidden(hidden)
    }
}

fn sensor_values(seed: u64) -> Vec<f32> {
    use rand::Rng;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..SENSOR_COUNT).map(|_| rng.gen_range(-1.0..=1.0)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_compile_is_deterministic(genome in arb_genome(48), counts in arb_counts()) {
        prop_assert_eq!(genome.compile(counts), genome.compile(counts));
    }

    #[test]
    fn test_compiled_ids_in_range(genome in arb_genome(48), counts in arb_counts()) {
        let brain = genome.compile(counts);
        prop_assert!(brain.neurons.len() <= counts.hidden);
        for conn in &brain.connections {
            match conn.source_kind {
                SourceKind::Sensor => prop_assert!(usize::from(conn.source_id) < counts.sensors),
                SourceKind::Hidden => prop_assert!(usize::from(conn.source_id) < brain.neurons.len()),
            }
            match conn.sink_kind {
                SinkKind::Hidden => prop_assert!(usize::from(conn.sink_id) < brain.neurons.len()),
                SinkKind::Action => prop_assert!(usize::from(conn.sink_id) < counts.actions),
            }
        }
    }

    #[test]
    fn test_hidden_sinks_come_first(genome in arb_genome(48), counts in arb_counts()) {
        let brain = genome.compile(counts);
        prop_assert!(brain.first_action <= brain.connections.len());
        prop_assert!(brain.hidden_connections().iter().all(|c| c.sink_kind == SinkKind::Hidden));
        prop_assert!(brain.action_connections().iter().all(|c| c.sink_kind == SinkKind::Action));
    }

    #[test]
    fn test_every_surviving_neuron_feeds_something_else(
        genome in arb_genome(48),
        counts in arb_counts()
    ) {
        let brain = genome.compile(counts);
        for n in 0..brain.neurons.len() {
            let id = n as u16;
            let outgoing = brain
                .connections
                .iter()
                .filter(|c| c.source_kind == SourceKind::Hidden && c.source_id == id)
                .count();
            let self_loops = brain
                .connections
                .iter()
                .filter(|c| c.is_self_loop() && c.source_id == id)
                .count();
            prop_assert!(outgoing > self_loops, "neuron {} is a dead end", n);
        }
    }

    #[test]
    fn test_fresh_brains_evaluate_identically(
        genome in arb_genome(48),
        counts in arb_counts(),
        seed in any::<u64>()
    ) {
        let sensors = sensor_values(seed);
        let mut first = genome.compile(counts);
        let mut second = genome.compile(counts);
        let a = first.evaluate(|s| sensors[s]);
        let b = second.evaluate(|s| sensors[s]);
        prop_assert_eq!(a.len(), counts.actions);
        prop_assert_eq!(a, b);
        prop_assert!(first.neurons.iter().all(|n| n.output.abs() <= 1.0));
    }

    #[test]
    fn test_normalization_is_idempotent(genome in arb_genome(48), counts in arb_counts()) {
        let once = genome.normalized(counts);
        prop_assert_eq!(once.len(), genome.len());
        prop_assert_eq!(once.normalized(counts), once.clone());
        prop_assert_eq!(once.compile(counts), genome.compile(counts));
    }

    #[test]
    fn test_crossover_without_mutation_is_index_wise(
        a in arb_genome(32),
        b in arb_genome(32),
        seed in any::<u64>()
    ) {
        let counts = NeuronCounts::with_hidden(4);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let child = a.crossover_with_rng(&b, 0.0, counts, &mut rng);
        prop_assert_eq!(child.len(), a.len().max(b.len()));
        for (i, gene) in child.iter().enumerate() {
            prop_assert!(a.genes.get(i) == Some(gene) || b.genes.get(i) == Some(gene));
        }
    }

    #[test]
    fn test_mutation_touches_at_most_one_gene(
        genome in arb_genome(32),
        p in 0.0f32..=1.0,
        seed in any::<u64>()
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut mutated = genome.clone();
        let changed = mutated.mutate_with_rng(p, &mut rng);
        let differing = genome.iter().zip(mutated.iter()).filter(|(x, y)| x != y).count();
        prop_assert_eq!(mutated.len(), genome.len());
        prop_assert!(differing <= 1);
        if !changed {
            prop_assert_eq!(differing, 0);
        }
    }

    #[test]
    fn test_splice_conserves_genes(a in arb_genome(32), b in arb_genome(32), cut in 0usize..40) {
        let (left, right) = a.splice(&b, cut);
        prop_assert_eq!(left.len() + right.len(), a.len() + b.len());
    }

    #[test]
    fn test_json_export_import_roundtrip(genome in arb_genome(32), counts in arb_counts()) {
        let json = evogrid_io::export_genome(&genome, counts).unwrap();
        let back = evogrid_io::import_genome(&json, counts, genome.len()).unwrap();
        prop_assert_eq!(back, genome.normalized(counts));
    }
}
