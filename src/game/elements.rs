//! The "name N elements nobody has named yet" penalty challenge.

use tracing::debug;

use crate::chem::PeriodicTable;

/// Result of one challenge attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeOutcome {
  pub success: bool,
  pub feedback: String,
}

/// Element names still available this session, lowercased.
#[derive(Debug, Clone)]
pub struct ElementPool {
  remaining: Vec<String>,
}

impl ElementPool {
  pub fn new(table: &PeriodicTable) -> Self {
    Self { remaining: table.elements().iter().map(|e| e.name.to_lowercase()).collect() }
  }

  pub fn remaining(&self) -> usize {
    self.remaining.len()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.remaining.iter().any(|n| n == name)
  }

  /// Checks a comma-separated answer. Only the first `required` entries count.
  /// On success the named elements leave the pool; on failure the pool is untouched.
  pub fn check_named(&mut self, answer: &str, required: usize) -> ChallengeOutcome {
    let entered: Vec<String> = answer.split(',').map(|e| e.trim().to_lowercase()).take(required).collect();
    if entered.len() < required {
      return ChallengeOutcome { success: false, feedback: "Not enough elements named.".into() };
    }

    let mut invalid: Vec<String> = Vec::new();
    for (i, name) in entered.iter().enumerate() {
      if !self.contains(name) || entered[..i].contains(name) {
        invalid.push(name.clone());
      }
    }

    if !invalid.is_empty() {
      debug!(target: "game", invalid = invalid.len(), "element challenge failed");
      return ChallengeOutcome {
        success: false,
        feedback: format!(
          "The following elements were either already used or were spelled incorrectly: {}",
          join_names(&invalid)
        ),
      };
    }

    self.remaining.retain(|n| !entered.contains(n));
    debug!(target: "game", remaining = self.remaining.len(), "element challenge passed");
    ChallengeOutcome { success: true, feedback: String::new() }
  }
}

/// "a", "a and b", "a, b, and c".
pub fn join_names(names: &[String]) -> String {
  match names {
    [] => String::new(),
    [one] => one.clone(),
    [a, b] => format!("{a} and {b}"),
    [init @ .., last] => format!("{}, and {last}", init.join(", ")),
  }
}
