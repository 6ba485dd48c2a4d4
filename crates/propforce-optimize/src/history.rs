//! Per-invocation log of objective evaluations.

use serde::Serialize;

/// One objective evaluation requested by a solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationRecord {
    /// Position in the evaluation sequence, counting from 0.
    pub iteration: usize,
    pub objective: f64,
    pub thrust: f64,
    pub power: f64,
}

/// Append-only evaluation log owned by a single optimizer run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationHistory {
    records: Vec<EvaluationRecord>,
}

impl EvaluationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an evaluation and return its index.
    pub fn record(&mut self, objective: f64, thrust: f64, power: f64) -> usize {
        let iteration = self.records.len();
        self.records.push(EvaluationRecord {
            iteration,
            objective,
            thrust,
            power,
        });
        iteration
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EvaluationRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EvaluationRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&EvaluationRecord> {
        self.records.last()
    }

    /// Objective values in evaluation order, for convergence plots.
    pub fn objectives(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.objective).collect()
    }

    pub fn into_records(self) -> Vec<EvaluationRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a EvaluationHistory {
    type Item = &'a EvaluationRecord;
    type IntoIter = std::slice::Iter<'a, EvaluationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_count_from_zero() {
        let mut history = EvaluationHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.record(3.0, 1.0, 3.0), 0);
        assert_eq!(history.record(2.0, 1.5, 2.0), 1);
        assert_eq!(history.len(), 2);
        let indices: Vec<usize> = history.iter().map(|r| r.iteration).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(history.objectives(), vec![3.0, 2.0]);
        assert_eq!(history.last().map(|r| r.thrust), Some(1.5));
    }

    #[test]
    fn test_into_records_keeps_order() {
        let mut history = EvaluationHistory::new();
        for i in 0..5 {
            history.record(i as f64, 0.0, 0.0);
        }
        let records = history.into_records();
        assert_eq!(records.len(), 5);
        assert_eq!(records[4].objective, 4.0);
    }
}
