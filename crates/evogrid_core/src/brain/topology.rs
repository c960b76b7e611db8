use super::*;
use std::collections::BTreeMap;

/// Bookkeeping for one hidden neuron while a genome is being compiled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HiddenNode {
    /// Outgoing connections, self-loops included.
    pub external_output_count: usize,
    pub self_input_count: usize,
    /// Incoming connections from sensors or other hidden neurons.
    pub external_input_count: usize,
    pub remapped_id: u16,
}

impl HiddenNode {
    /// A neuron whose only outputs loop back into itself drives nothing.
    #[must_use]
    pub fn is_dead_end(&self) -> bool {
        self.external_output_count == self.self_input_count
    }
}

pub type NodeTable = BTreeMap<u16, HiddenNode>;

pub fn random_gene_with_rng<R: Rng>(counts: NeuronCounts, rng: &mut R) -> Gene {
    let source_kind = if counts.hidden > 0 && rng.gen_bool(0.5) {
        SourceKind::Hidden
    } else {
        SourceKind::Sensor
    };
    let sink_kind = if counts.hidden > 0 && rng.gen_bool(0.5) {
        SinkKind::Hidden
    } else {
        SinkKind::Action
    };
    let source_range = match source_kind {
        SourceKind::Sensor => counts.sensors,
        SourceKind::Hidden => counts.hidden,
    };
    let sink_range = match sink_kind {
        SinkKind::Hidden => counts.hidden,
        SinkKind::Action => counts.actions,
    };

    Gene {
        source_kind,
        source_id: rng.gen_range(0..source_range.clamp(1, usize::from(u16::MAX))) as u16,
        sink_kind,
        sink_id: rng.gen_range(0..sink_range.clamp(1, usize::from(u16::MAX))) as u16,
        weight: rng.gen::<i16>(),
    }
}

fn reduce(id: u16, count: usize) -> Option<u16> {
    if count == 0 {
        None
    } else {
        Some((usize::from(id) % count) as u16)
    }
}

/// Reduces every id modulo the neuron count of its kind. Genes that point at
/// a kind with no neurons are dropped.
pub fn normalize(genome: &Genome, counts: NeuronCounts) -> Vec<Gene> {
    genome
        .genes
        .iter()
        .filter_map(|gene| {
            let source_id = match gene.source_kind {
                SourceKind::Sensor => reduce(gene.source_id, counts.sensors)?,
                SourceKind::Hidden => reduce(gene.source_id, counts.hidden)?,
            };
            let sink_id = match gene.sink_kind {
                SinkKind::Hidden => reduce(gene.sink_id, counts.hidden)?,
                SinkKind::Action => reduce(gene.sink_id, counts.actions)?,
            };
            Some(Gene {
                source_id,
                sink_id,
                ..*gene
            })
        })
        .collect()
}

pub fn count_degrees(genes: &[Gene]) -> NodeTable {
    let mut nodes = NodeTable::new();
    for gene in genes {
        if gene.sink_kind == SinkKind::Hidden {
            let node = nodes.entry(gene.sink_id).or_default();
            if gene.is_self_loop() {
                node.self_input_count += 1;
            } else {
                node.external_input_count += 1;
            }
        }
        if gene.source_kind == SourceKind::Hidden {
            nodes.entry(gene.source_id).or_default().external_output_count += 1;
        }
    }
    nodes
}

/// Removes dead-end neurons and every gene feeding them until no dead end
/// remains. Removing one neuron can starve the neurons that fed it.
pub fn prune(genes: &mut Vec<Gene>, nodes: &mut NodeTable) {
    loop {
        let doomed: Vec<u16> = nodes
            .iter()
            .filter(|(_, node)| node.is_dead_end())
            .map(|(&id, _)| id)
            .collect();
        if doomed.is_empty() {
            break;
        }

        for id in doomed {
            genes.retain(|gene| {
                if gene.sink_kind != SinkKind::Hidden || gene.sink_id != id {
                    return true;
                }
                if gene.source_kind == SourceKind::Hidden {
                    if let Some(source) = nodes.get_mut(&gene.source_id) {
                        source.external_output_count =
                            source.external_output_count.saturating_sub(1);
                    }
                }
                false
            });
            nodes.remove(&id);
        }
    }
}

/// Assigns dense ids `0..nodes.len()` in ascending original-id order.
pub fn renumber(nodes: &mut NodeTable) {
    for (dense, node) in nodes.values_mut().enumerate() {
        node.remapped_id = dense as u16;
    }
}

fn remap_source(gene: &Gene, nodes: &NodeTable) -> Option<u16> {
    match gene.source_kind {
        SourceKind::Sensor => Some(gene.source_id),
        SourceKind::Hidden => nodes.get(&gene.source_id).map(|n| n.remapped_id),
    }
}

/// Compiles a genome into an evaluable brain.
///
/// The result depends only on `genome` and `counts`; compiling twice yields
/// equal brains.
pub fn compile(genome: &Genome, counts: NeuronCounts) -> CompiledBrain {
    let mut genes = normalize(genome, counts);
    let mut nodes = count_degrees(&genes);
    prune(&mut genes, &mut nodes);
    renumber(&mut nodes);

    let mut connections = Vec::with_capacity(genes.len());
    for gene in genes.iter().filter(|g| g.sink_kind == SinkKind::Hidden) {
        let (Some(source_id), Some(sink)) = (remap_source(gene, &nodes), nodes.get(&gene.sink_id))
        else {
            continue;
        };
        connections.push(Gene {
            source_id,
            sink_id: sink.remapped_id,
            ..*gene
        });
    }

    let first_action = connections.len();
    for gene in genes.iter().filter(|g| g.sink_kind == SinkKind::Action) {
        if let Some(source_id) = remap_source(gene, &nodes) {
            connections.push(Gene {
                source_id,
                ..*gene
            });
        }
    }

    let neurons = nodes
        .values()
        .map(|node| Neuron {
            output: INITIAL_NEURON_OUTPUT,
            driven: node.external_input_count != 0,
        })
        .collect();

    CompiledBrain {
        connections,
        neurons,
        first_action,
        counts,
    }
}
