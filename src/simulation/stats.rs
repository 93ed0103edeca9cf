//! Per-generation fitness statistics and their bounded history.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::generation::GenerationSummary;

/// Per-generation fitness statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generation number.
    pub generation: u32,
    /// Highest fitness in the population.
    pub best: f64,
    /// Mean fitness.
    pub mean: f64,
    /// Population standard deviation of fitness.
    pub stdev: f64,
    /// Pipes passed during the generation.
    pub score: u32,
    /// Ticks the generation lasted.
    pub ticks: u64,
    /// Generations since the champion last improved.
    pub stagnation: u32,
}

impl GenerationReport {
    /// Computes statistics over a fitness sample.
    pub fn from_fitness(generation: u32, fitness: &[f64], stagnation: u32) -> Self {
        let n = fitness.len();
        let (best, mean, stdev) = if n == 0 {
            (0.0, 0.0, 0.0)
        } else {
            let best = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = fitness.iter().sum::<f64>() / n as f64;
            let variance = fitness.iter().map(|f| (f - mean).powi(2)).sum::<f64>() / n as f64;
            (best, mean, variance.sqrt())
        };

        Self {
            generation,
            best,
            mean,
            stdev,
            score: 0,
            ticks: 0,
            stagnation,
        }
    }

    /// Attaches the evaluator's summary.
    pub fn with_summary(mut self, summary: &GenerationSummary) -> Self {
        self.score = summary.score;
        self.ticks = summary.ticks;
        self
    }
}

/// Bounded history of generation reports, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessHistory {
    /// Recorded reports.
    pub reports: VecDeque<GenerationReport>,
    /// Maximum number of reports kept
    pub max_history: usize,
}

impl Default for FitnessHistory {
    fn default() -> Self {
        Self::with_capacity(500)
    }
}

impl FitnessHistory {
    /// Creates an empty history that keeps at most `max_history` reports.
    pub fn with_capacity(max_history: usize) -> Self {
        Self {
            reports: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Appends a report, dropping the oldest one when full.
    pub fn record(&mut self, report: GenerationReport) {
        self.reports.push_back(report);
        if self.reports.len() > self.max_history {
            self.reports.pop_front();
        }
    }

    /// Most recent report.
    pub fn latest(&self) -> Option<&GenerationReport> {
        self.reports.back()
    }

    /// Best fitness ever recorded.
    pub fn best(&self) -> Option<f64> {
        self.reports.iter().map(|r| r.best).reduce(f64::max)
    }

    /// Highest score ever recorded.
    pub fn best_score(&self) -> u32 {
        self.reports.iter().map(|r| r.score).max().unwrap_or(0)
    }

    /// Number of reports kept.
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// True when nothing was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// `[generation, value]` points for plotting.
    pub fn series(&self, value: impl Fn(&GenerationReport) -> f64) -> Vec<[f64; 2]> {
        self.reports
            .iter()
            .map(|r| [f64::from(r.generation), value(r)])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_statistics() {
        let report = GenerationReport::from_fitness(3, &[1.0, 2.0, 3.0, 4.0], 1);
        assert_eq!(report.generation, 3);
        assert!((report.best - 4.0).abs() < 1e-12);
        assert!((report.mean - 2.5).abs() < 1e-12);
        assert!((report.stdev - 1.25f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn empty_sample_is_zero() {
        let report = GenerationReport::from_fitness(0, &[], 0);
        assert_eq!(report.best, 0.0);
        assert_eq!(report.mean, 0.0);
    }

    #[test]
    fn history_is_bounded() {
        let mut history = FitnessHistory::with_capacity(3);
        for generation in 0..5 {
            let mut report = GenerationReport::from_fitness(generation, &[f64::from(generation)], 0);
            report.score = generation;
            history.record(report);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.reports.front().map(|r| r.generation), Some(2));
        assert_eq!(history.best(), Some(4.0));
        assert_eq!(history.best_score(), 4);
        assert_eq!(history.latest().map(|r| r.generation), Some(4));
        assert_eq!(history.series(|r| r.best)[0], [2.0, 2.0]);
    }
}
