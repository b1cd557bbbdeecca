//! Formatting numbers for people.

use chrono::Duration;
use std::fmt::{self, Display, Formatter};

/// Format an amount as Chilean pesos, e.g. `$1.234.567`.
///
/// Pesos have no minor unit, so the amount is rounded to a whole number.
pub fn format_clp(amount: f64) -> String {
    let rounded = amount.round();
    let digits = (rounded.abs() as u64).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}${}", sign, grouped)
}

/// How healthy the money left this cycle looks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BalanceStatus {
    /// Nothing left, or already overspent.
    Negative,
    /// Running low.
    Warning,
    Positive,
}

impl BalanceStatus {
    /// Below this many pesos the balance is running low.
    pub const WARNING_BELOW: f64 = 10_000.0;

    pub fn of(available: f64) -> Self {
        if available <= 0.0 {
            BalanceStatus::Negative
        } else if available < Self::WARNING_BELOW {
            BalanceStatus::Warning
        } else {
            BalanceStatus::Positive
        }
    }
}

impl Display for BalanceStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            BalanceStatus::Negative => "negative",
            BalanceStatus::Warning => "warning",
            BalanceStatus::Positive => "positive",
        };
        f.write_str(label)
    }
}

/// Format how long a session has been running, e.g. `1h 2m 5s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.num_seconds().max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
