//! The budget, expense and history records exchanged with the backend.
//!
//! The backend owns every calculation, so these types only describe the
//! fields the client reads. Anything else is kept in `extra` and passed
//! through untouched.

use serde::{de::Error as _, Deserialize as _, Deserializer};
use serde_derive::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// The current budget cycle and its running totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Budget {
    #[serde(default, deserialize_with = "amount")]
    pub monthly_income: f64,
    #[serde(default, deserialize_with = "amount")]
    pub savings_goal: f64,
    /// The day of the month a new cycle starts on.
    #[serde(default)]
    pub cycle_start_day: Option<u8>,
    #[serde(default, deserialize_with = "amount")]
    pub total_fixed_expenses: f64,
    #[serde(default, deserialize_with = "amount")]
    pub total_ant_expenses: f64,
    #[serde(default, deserialize_with = "amount")]
    pub available_money: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single ant expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Expense {
    pub id: u64,
    #[serde(default, deserialize_with = "amount")]
    pub amount: f64,
    /// The raw category code. Older records may use codes this client
    /// doesn't know about, so it isn't a [`Category`].
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub category_display: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A recurring monthly commitment (rent, subscriptions, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct FixedExpense {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "amount")]
    pub amount: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A closed budget period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct HistoryPeriod {
    pub id: u64,
    #[serde(default)]
    pub period_start: Option<String>,
    #[serde(default)]
    pub period_end: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "amount")]
    pub monthly_income: f64,
    #[serde(default, deserialize_with = "amount")]
    pub total_fixed_expenses: f64,
    #[serde(default, deserialize_with = "amount")]
    pub total_ant_expenses: f64,
    #[serde(default, deserialize_with = "amount")]
    pub remaining: f64,
    #[serde(default, deserialize_with = "amount")]
    pub saved_amount: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The kinds of ant expense a user can log.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Cafe,
    Snacks,
    Transporte,
    Delivery,
    Entretenimiento,
    Compras,
    Otros,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Cafe,
        Category::Snacks,
        Category::Transporte,
        Category::Delivery,
        Category::Entretenimiento,
        Category::Compras,
        Category::Otros,
    ];

    /// The code the backend uses for this category.
    pub fn code(self) -> &'static str {
        match self {
            Category::Cafe => "cafe",
            Category::Snacks => "snacks",
            Category::Transporte => "transporte",
            Category::Delivery => "delivery",
            Category::Entretenimiento => "entretenimiento",
            Category::Compras => "compras",
            Category::Otros => "otros",
        }
    }
}

impl Default for Category {
    fn default() -> Self { Category::Otros }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Category, Self::Err> {
        let wanted = s.trim().to_lowercase();

        Category::ALL
            .iter()
            .copied()
            .find(|category| category.code() == wanted)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("\"{0}\" is not a known category")]
pub struct UnknownCategory(String);

/// The body of `POST /finance/expenses/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewExpense {
    pub amount: f64,
    pub category: Category,
    pub description: Option<String>,
}

impl NewExpense {
    pub fn new(amount: f64, category: Category) -> Self {
        NewExpense {
            amount,
            category,
            description: None,
        }
    }

    /// Attach a description. Blank descriptions are sent as `null`.
    pub fn with_description<S>(mut self, description: S) -> Self
    where
        S: Into<String>,
    {
        let description = description.into();
        self.description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        self
    }
}

/// The body of `PUT /finance/budget/`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct BudgetUpdate {
    monthly_income: i64,
    savings_goal: i64,
    cycle_start_day: u8,
}

impl BudgetUpdate {
    pub const FIRST_CYCLE_DAY: u8 = 1;
    /// Every month has a 28th, so cycles can't start any later.
    pub const LAST_CYCLE_DAY: u8 = 28;

    /// Create an update, clamping the cycle start into
    /// `FIRST_CYCLE_DAY..=LAST_CYCLE_DAY`.
    pub fn new(
        monthly_income: i64,
        savings_goal: i64,
        cycle_start_day: i64,
    ) -> Self {
        let day = cycle_start_day
            .max(i64::from(Self::FIRST_CYCLE_DAY))
            .min(i64::from(Self::LAST_CYCLE_DAY));

        BudgetUpdate {
            monthly_income,
            savings_goal,
            cycle_start_day: day as u8,
        }
    }

    pub fn monthly_income(&self) -> i64 { self.monthly_income }

    pub fn savings_goal(&self) -> i64 { self.savings_goal }

    pub fn cycle_start_day(&self) -> u8 { self.cycle_start_day }
}

/// The body of `POST /finance/fixed-expenses/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewFixedExpense {
    pub name: String,
    pub amount: i64,
}

/// List endpoints answer either with a bare array or a paginated page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Plain(Vec<T>),
    Paginated { results: Vec<T> },
}

impl<T> Listing<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Plain(items) => items,
            Listing::Paginated { results } => results,
        }
    }
}

/// Money may arrive as a JSON number, a decimal string (`"2500.00"`) or
/// `null`.
fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Null(()),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(text) => text.trim().parse().map_err(D::Error::custom),
        Raw::Null(()) => Ok(0.0),
    }
}
