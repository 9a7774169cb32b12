use std::cmp::Ordering;
use std::collections::HashMap;

use super::{Classifier, ClassifierFactory, Error, Observation};

/// Naive Bayes over feature/action counts with add-one smoothing.
#[derive(Clone, Debug, Default)]
pub struct FrequencyClassifier {
    actions: HashMap<String, f64>,
    counts: HashMap<String, HashMap<String, f64>>,
    total: f64,
}

impl FrequencyClassifier {
    pub fn new() -> Self {
        FrequencyClassifier::default()
    }

    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    fn log_scores(&self, features: &[String]) -> Vec<(String, f64)> {
        let num_actions = self.actions.len() as f64;
        self.actions
            .iter()
            .map(|(action, &count)| {
                let mut score = ((count + 1.0) / (self.total + num_actions)).ln();
                for feature in features {
                    let (joint, marginal) = match self.counts.get(feature) {
                        Some(by_action) => (
                            by_action.get(action).cloned().unwrap_or(0.0),
                            by_action.values().sum::<f64>(),
                        ),
                        None => (0.0, 0.0),
                    };
                    score += ((joint + 1.0) / (marginal + num_actions)).ln();
                }
                (action.clone(), score)
            })
            .collect()
    }
}

impl Classifier for FrequencyClassifier {
    fn train(&mut self, observations: &[Observation]) -> Result<(), Error> {
        if observations.is_empty() {
            return Err(Error::Classifier("no observations".to_string()));
        }
        for observation in observations {
            *self.actions.entry(observation.action.clone()).or_insert(0.0) += 1.0;
            self.total += 1.0;
            for feature in &observation.features {
                *self
                    .counts
                    .entry(feature.clone())
                    .or_insert_with(HashMap::new)
                    .entry(observation.action.clone())
                    .or_insert(0.0) += 1.0;
            }
        }
        Ok(())
    }

    fn predict(&self, features: &[String]) -> Vec<String> {
        let mut scores = self.log_scores(features);
        scores.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scores.into_iter().map(|(action, _)| action).collect()
    }

    fn probability(&self, features: &[String], action: &str) -> f64 {
        let scores = self.log_scores(features);
        let max = scores
            .iter()
            .map(|&(_, s)| s)
            .fold(std::f64::NEG_INFINITY, f64::max);
        let norm: f64 = scores.iter().map(|&(_, s)| (s - max).exp()).sum();
        scores
            .iter()
            .find(|&&(ref a, _)| a == action)
            .map_or(0.0, |&(_, s)| (s - max).exp() / norm)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FrequencyClassifierFactory;

impl ClassifierFactory for FrequencyClassifierFactory {
    type Output = FrequencyClassifier;

    fn create(&self) -> FrequencyClassifier {
        FrequencyClassifier::new()
    }
}
