//! Splitting a group bill and logging your own share.

use crate::{Category, FormError, NewExpense};
use std::convert::TryFrom;

/// A bill shared between `people`, e.g. a dinner out.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SharedExpense {
    total: u64,
    people: u32,
}

impl SharedExpense {
    /// Nobody splits a bill between zero people, so `people` is at least 1.
    pub fn new(total: u64, people: u32) -> Self {
        SharedExpense {
            total,
            people: people.max(1),
        }
    }

    /// Read the amounts as typed into a form.
    ///
    /// Each field is read up to its first non-digit, so `"1500.50"` is a
    /// total of 1500 and `"2.5"` is 2 people. A field that doesn't start
    /// with a number, or is zero, counts as a total of 0 or 1 person.
    pub fn parse(total: &str, people: &str) -> Result<Self, FormError> {
        let total = match leading_integer(total)? {
            Some(total) if total < 0 => return Err(FormError::NonPositiveAmount),
            Some(total) => total as u64,
            None => 0,
        };
        let people = match leading_integer(people)? {
            Some(people) if people < 0 => {
                return Err(FormError::NonPositiveHeadcount)
            },
            Some(people) => u32::try_from(people)
                .map_err(|_| FormError::TooLarge(people.to_string()))?,
            None => 1,
        };

        Ok(SharedExpense::new(total, people))
    }

    pub fn total(&self) -> u64 { self.total }

    pub fn people(&self) -> u32 { self.people }

    /// Each person's share, rounded up so the bill is always covered.
    pub fn share(&self) -> u64 {
        let people = u64::from(self.people);
        self.total / people + u64::from(self.total % people != 0)
    }

    /// Turn your share into an expense, defaulting the description to one
    /// which mentions the headcount.
    pub fn into_expense(
        self,
        category: Category,
        description: Option<&str>,
    ) -> Result<NewExpense, FormError> {
        let share = self.share();
        if share == 0 {
            return Err(FormError::NonPositiveAmount);
        }

        let description = match description {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => format!("Shared expense ({} people)", self.people),
        };

        Ok(NewExpense::new(share as f64, category).with_description(description))
    }
}

/// The integer at the start of `raw`, ignoring leading whitespace. Zero is
/// treated the same as no number at all.
fn leading_integer(raw: &str) -> Result<Option<i64>, FormError> {
    let raw = raw.trim_start();
    let (negative, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or_else(|| unsigned.len());
    let digits = &unsigned[..end];

    if digits.is_empty() {
        return Ok(None);
    }

    let value: i64 = digits
        .parse()
        .map_err(|_| FormError::TooLarge(digits.to_string()))?;

    match value {
        0 => Ok(None),
        _ if negative => Ok(Some(-value)),
        _ => Ok(Some(value)),
    }
}
