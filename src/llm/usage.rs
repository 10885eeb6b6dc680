/*!
 * Monetary cost and token accounting.
 *
 * `Usage` is a plain value returned by every exchange and summed by whoever
 * composes several exchanges. `CostTracker` is the caller-owned running total;
 * nothing inside the pipelines or evaluators holds one.
 */

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Cost and tokens of one or more exchanges
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Cost in USD
    pub cost: f64,
    /// Total tokens (prompt + completion)
    pub tokens: u64,
}

impl Usage {
    /// Create a usage value
    pub fn new(cost: f64, tokens: u64) -> Self {
        Self { cost, tokens }
    }

    /// Usage of work that never reached a model
    pub fn zero() -> Self {
        Self::default()
    }
}

impl Add for Usage {
    type Output = Usage;

    fn add(self, other: Usage) -> Usage {
        Usage {
            cost: self.cost + other.cost,
            tokens: self.tokens + other.tokens,
        }
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, other: Usage) {
        *self = *self + other;
    }
}

impl Sum for Usage {
    fn sum<I: Iterator<Item = Usage>>(iter: I) -> Usage {
        iter.fold(Usage::zero(), Add::add)
    }
}

/// Running total of usage across calls, owned by the front end.
#[derive(Debug, Clone, Default)]
pub struct CostTracker {
    total: Usage,
    calls: usize,
}

impl CostTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the usage returned by one call
    pub fn add(&mut self, usage: Usage) {
        self.add_calls(usage, 1);
    }

    /// Add the summed usage of `calls` calls, e.g. one per evaluated row
    pub fn add_calls(&mut self, usage: Usage, calls: usize) {
        self.total += usage;
        self.calls += calls;
    }

    /// Accumulated usage
    pub fn total(&self) -> Usage {
        self.total
    }

    /// Number of calls recorded
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// One-line human summary
    pub fn summary(&self) -> String {
        if self.total.cost > 0.0 {
            format!(
                "Cost: ${:.5} ({} tokens over {} call(s))",
                self.total.cost, self.total.tokens, self.calls
            )
        } else {
            format!("Cost: $0 ({} tokens over {} call(s))", self.total.tokens, self.calls)
        }
    }
}
