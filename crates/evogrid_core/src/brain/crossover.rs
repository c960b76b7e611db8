use super::*;

/// Where a child's gene at one index came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneOrigin {
    First,
    Second,
    Fresh,
}

impl GeneOrigin {
    /// Three-way split: `mutation_percent` fresh, the rest halved between
    /// the parents.
    pub fn pick_with_rng<R: Rng>(mutation_percent: f32, rng: &mut R) -> Self {
        let p_fresh = (mutation_percent / 100.0).clamp(0.0, 1.0);
        let p_first = p_fresh + (1.0 - p_fresh) / 2.0;
        let roll: f32 = rng.gen();
        if roll < p_fresh {
            GeneOrigin::Fresh
        } else if roll < p_first {
            GeneOrigin::First
        } else {
            GeneOrigin::Second
        }
    }
}

/// Builds a child gene by gene. Index `i` of the child is always `a[i]`,
/// `b[i]` or a fresh random gene. Parents of unequal length contribute only
/// where they have a gene; the child takes the longer length.
pub fn crossover_with_rng<R: Rng>(
    a: &Genome,
    b: &Genome,
    mutation_percent: f32,
    counts: NeuronCounts,
    rng: &mut R,
) -> Genome {
    let len = a.len().max(b.len());
    let genes = (0..len)
        .map(|i| {
            let origin = GeneOrigin::pick_with_rng(mutation_percent, rng);
            match (origin, a.genes.get(i), b.genes.get(i)) {
                (GeneOrigin::First, Some(gene), _) | (GeneOrigin::Second, _, Some(gene)) => *gene,
                (GeneOrigin::First, None, Some(gene)) | (GeneOrigin::Second, Some(gene), None) => {
                    *gene
                }
                _ => topology::random_gene_with_rng(counts, rng),
            }
        })
        .collect();
    Genome::from_genes(genes)
}

/// Cuts both parents at `cut` and swaps tails: returns
/// `(a[..cut] ++ b[cut..], b[..cut] ++ a[cut..])`.
pub fn splice(a: &Genome, b: &Genome, cut: usize) -> (Genome, Genome) {
    let cut_a = cut.min(a.len());
    let cut_b = cut.min(b.len());
    let first = a.genes[..cut_a]
        .iter()
        .chain(&b.genes[cut_b..])
        .copied()
        .collect();
    let second = b.genes[..cut_b]
        .iter()
        .chain(&a.genes[cut_a..])
        .copied()
        .collect();
    (Genome::from_genes(first), Genome::from_genes(second))
}
