//! Per-provider request pacing
//!
//! A [`RateLimiter`] enforces a minimum delay between two consecutive calls
//! and, optionally, a budget of at most `max_calls` per rolling `window`.
//! [`RateLimiter::acquire`] suspends the caller until the next call is allowed.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::{Instant, sleep_until};

/// Calls allowed per rolling window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestBudget {
    pub max_calls: u32,
    pub window: Duration,
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    budget: Option<RequestBudget>,
    last_call: Option<Instant>,
    /// Start times of the calls inside the current window
    recent: VecDeque<Instant>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            budget: None,
            last_call: None,
            recent: VecDeque::new(),
        }
    }

    /// Also cap the number of calls per window; a zero budget is ignored
    pub fn with_budget(mut self, max_calls: u32, window: Duration) -> Self {
        self.budget = (max_calls > 0 && !window.is_zero()).then_some(RequestBudget { max_calls, window });
        self
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn budget(&self) -> Option<RequestBudget> {
        self.budget
    }

    /// Earliest instant the next call may start
    pub fn next_slot(&self) -> Instant {
        let now = Instant::now();
        let mut ready_at = self
            .last_call
            .map_or(now, |last| (last + self.min_interval).max(now));

        if let Some(budget) = self.budget {
            let in_window: Vec<&Instant> = self
                .recent
                .iter()
                .filter(|start| **start + budget.window > ready_at)
                .collect();
            if in_window.len() >= budget.max_calls as usize {
                // Wait for the oldest call that still counts to leave the window
                let excess = in_window.len() + 1 - budget.max_calls as usize;
                if let Some(oldest) = in_window.get(excess - 1) {
                    ready_at = ready_at.max(**oldest + budget.window);
                }
            }
        }

        ready_at
    }

    /// Wait until a call is allowed and record it
    pub async fn acquire(&mut self) {
        let ready_at = self.next_slot();
        if ready_at > Instant::now() {
            tracing::debug!(
                wait_ms = (ready_at - Instant::now()).as_millis() as u64,
                "Rate limit delay"
            );
            sleep_until(ready_at).await;
        }

        let started = Instant::now();
        self.last_call = Some(started);

        if let Some(budget) = self.budget {
            while self
                .recent
                .front()
                .is_some_and(|oldest| *oldest + budget.window <= started)
            {
                self.recent.pop_front();
            }
            self.recent.push_back(started);
        }
    }
}
