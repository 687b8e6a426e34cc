use std::{
    collections::{hash_map::Entry, HashMap},
    ops::Index,
};

/// Represents a Markov decision process, defining the dynamics of an environment
/// in which an agent can operate.
///
/// This base trait represents the common case of a discrete-time MDP with one agent,
/// following the episodic `reset`/`step` contract: an episode ends when a step reports
/// either `terminated` (a terminal state was reached) or `truncated` (the episode was cut short).
pub trait Environment {
    /// A representation of the state of the environment to be passed to an agent
    type Observation: Clone;

    /// A representation of an action that an agent can take to affect the environment
    type Action: Clone;

    /// Diagnostic information returned alongside every observation
    type Info;

    /// Reset the environment to an initial state, reseeding its random source first if `seed` is given
    ///
    /// **Returns** `(observation, info)`
    fn reset(&mut self, seed: Option<u64>) -> (Self::Observation, Self::Info);

    /// Update the environment in response to an action taken by an agent
    fn step(&mut self, action: Self::Action) -> Step<Self::Observation, Self::Info>;

    /// The observation of the current state
    fn observation(&self) -> Self::Observation;
}

/// An [`Environment`] with a finite set of actions
pub trait DiscreteActionSpace: Environment {
    /// Get the available actions for the current state
    ///
    /// The returned vector should never be empty.
    fn actions(&self) -> Vec<Self::Action>;
}

/// The outcome of a single [`Environment::step`]
#[derive(Clone, Debug, PartialEq)]
pub struct Step<O, I> {
    pub observation: O,
    pub reward: f64,
    /// A terminal state was reached
    pub terminated: bool,
    /// The episode was cut short before reaching a terminal state
    pub truncated: bool,
    pub info: I,
}

impl<O, I> Step<O, I> {
    /// Whether the episode is over after this step
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Named per-episode metrics accumulated by an environment
#[derive(Debug, Clone, Default)]
pub struct Report {
    values: HashMap<&'static str, f64>,
}

impl Report {
    pub fn new(keys: &[&'static str]) -> Self {
        let values = keys.iter().map(|&k| (k, 0.0)).collect();
        Self { values }
    }

    pub fn entry(&mut self, key: &'static str) -> Entry<'_, &'static str, f64> {
        self.values.entry(key)
    }

    /// Zero every metric
    pub fn clear(&mut self) {
        self.values.values_mut().for_each(|v| *v = 0.0);
    }

    /// Return the current metrics and zero them
    pub fn take(&mut self) -> HashMap<&'static str, f64> {
        let report = self.values.clone();
        self.clear();
        report
    }
}

impl Index<&str> for Report {
    type Output = f64;

    fn index(&self, key: &str) -> &Self::Output {
        &self.values[key]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_accumulates_and_takes() {
        let mut report = Report::new(&["reward", "steps"]);

        report.entry("steps").and_modify(|x| *x += 1.0);
        report.entry("steps").and_modify(|x| *x += 1.0);
        report.entry("reward").and_modify(|x| *x -= 0.5);
        assert_eq!(report["steps"], 2.0, "Steps accumulated");
        assert_eq!(report["reward"], -0.5, "Reward accumulated");

        let taken = report.take();
        assert_eq!(taken["steps"], 2.0, "Taken report keeps values");
        assert_eq!(report["steps"], 0.0, "Report zeroed after take");
        assert_eq!(report["reward"], 0.0, "Report zeroed after take");
    }
}
