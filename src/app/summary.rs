use evogrid_core::GenerationReport;
use serde::{Deserialize, Serialize};

/// Outcome of an [`super::App`] run, printable as a status block or JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub generations: u64,
    pub births: u64,
    pub deaths: u64,
    pub population: usize,
    pub species: usize,
    pub best_fitness: f32,
    pub overall_best_fitness: f32,
    pub reports: Vec<GenerationReport>,
}

impl RunSummary {
    /// Mean of the per-generation best fitness values.
    #[must_use]
    pub fn mean_best_fitness(&self) -> f32 {
        if self.reports.is_empty() {
            return 0.0;
        }
        self.reports.iter().map(|r| r.best_fitness).sum::<f32>() / self.reports.len() as f32
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "ticks run        {}", self.ticks)?;
        writeln!(f, "generations      {}", self.generations)?;
        writeln!(f, "population       {}", self.population)?;
        writeln!(f, "species          {}", self.species)?;
        writeln!(f, "births / deaths  {} / {}", self.births, self.deaths)?;
        writeln!(f, "best fitness     {:.4}", self.best_fitness)?;
        write!(f, "overall best     {:.4}", self.overall_best_fitness)
    }
}
