use super::*;

/// The five single-bit edits a point mutation can make, chosen 20% each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointMutation {
    SourceKind,
    SinkKind,
    SourceId(u32),
    SinkId(u32),
    Weight(u32),
}

impl PointMutation {
    pub fn random_with_rng<R: Rng>(rng: &mut R) -> Self {
        let roll: f32 = rng.gen();
        let bit = rng.gen_range(0..16);
        if roll < 0.2 {
            PointMutation::SourceKind
        } else if roll < 0.4 {
            PointMutation::SinkKind
        } else if roll < 0.6 {
            PointMutation::SourceId(bit)
        } else if roll < 0.8 {
            PointMutation::SinkId(bit)
        } else {
            PointMutation::Weight(bit)
        }
    }

    pub fn apply(self, gene: &mut Gene) {
        match self {
            PointMutation::SourceKind => gene.source_kind = gene.source_kind.flipped(),
            PointMutation::SinkKind => gene.sink_kind = gene.sink_kind.flipped(),
            PointMutation::SourceId(bit) => gene.source_id ^= 1 << bit,
            PointMutation::SinkId(bit) => gene.sink_id ^= 1 << bit,
            PointMutation::Weight(bit) => gene.weight ^= (1_u16 << bit) as i16,
        }
    }
}

/// With probability `p_mutation`, flips one bit of one uniformly chosen
/// gene. Returns whether the genome changed.
pub fn mutate_with_rng<R: Rng>(genome: &mut Genome, p_mutation: f32, rng: &mut R) -> bool {
    if genome.is_empty() || rng.gen::<f32>() >= p_mutation {
        return false;
    }
    let idx = rng.gen_range(0..genome.len());
    let edit = PointMutation::random_with_rng(rng);
    edit.apply(&mut genome.genes[idx]);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn differing_genes(a: &Genome, b: &Genome) -> usize {
        a.iter().zip(b.iter()).filter(|(x, y)| x != y).count()
    }

    #[test]
    fn test_zero_probability_never_mutates() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let original = Genome::new_random_with_rng(10, NeuronCounts::with_hidden(3), &mut rng);
        let mut genome = original.clone();
        for _ in 0..100 {
            assert!(!mutate_with_rng(&mut genome, 0.0, &mut rng));
        }
        assert_eq!(genome, original);
    }

    #[test]
    fn test_certain_mutation_touches_exactly_one_gene() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let counts = NeuronCounts::with_hidden(3);
        for _ in 0..100 {
            let original = Genome::new_random_with_rng(10, counts, &mut rng);
            let mut genome = original.clone();
            assert!(mutate_with_rng(&mut genome, 1.0, &mut rng));
            assert_eq!(differing_genes(&original, &genome), 1);
        }
    }

    #[test]
    fn test_point_mutations_flip_single_bits() {
        let mut gene = Gene::new(SourceKind::Sensor, 0b1010, SinkKind::Action, 3, 0);
        PointMutation::SourceKind.apply(&mut gene);
        assert_eq!(gene.source_kind, SourceKind::Hidden);
        PointMutation::SinkKind.apply(&mut gene);
        assert_eq!(gene.sink_kind, SinkKind::Hidden);
        PointMutation::SourceId(1).apply(&mut gene);
        assert_eq!(gene.source_id, 0b1000);
        PointMutation::SinkId(0).apply(&mut gene);
        assert_eq!(gene.sink_id, 2);
        PointMutation::Weight(15).apply(&mut gene);
        assert_eq!(gene.weight, i16::MIN);
    }

    #[test]
    fn test_mutation_kinds_are_roughly_balanced() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut tally = [0_usize; 5];
        for _ in 0..5000 {
            let slot = match PointMutation::random_with_rng(&mut rng) {
                PointMutation::SourceKind => 0,
                PointMutation::SinkKind => 1,
                PointMutation::SourceId(_) => 2,
                PointMutation::SinkId(_) => 3,
                PointMutation::Weight(_) => 4,
            };
            tally[slot] += 1;
        }
        for count in tally {
            assert!((800..1200).contains(&count), "unbalanced split: {tally:?}");
        }
    }
}
