use super::EndpointError;
use crate::{finance::Listing, Expense, Gateway, NewExpense, RequestOptions};
use reqwest::Method;

const EXPENSES: &str = "/finance/expenses/";

/// List the ant expenses logged so far.
pub async fn get_expenses(
    gateway: &Gateway,
) -> Result<Vec<Expense>, EndpointError> {
    let listing: Listing<Expense> =
        super::fetch(gateway, EXPENSES, RequestOptions::get()).await?;

    Ok(listing.into_vec())
}

/// Log a new ant expense.
///
/// Rejected fields come back as [`EndpointError::Validation`].
pub async fn add_expense(
    gateway: &Gateway,
    expense: &NewExpense,
) -> Result<Expense, EndpointError> {
    log::debug!("Adding an expense of {} ({})", expense.amount, expense.category);

    let options = RequestOptions::json(Method::POST, expense)?;
    super::fetch(gateway, EXPENSES, options).await
}

pub async fn delete_expense(
    gateway: &Gateway,
    id: u64,
) -> Result<(), EndpointError> {
    let endpoint = format!("{}{}/", EXPENSES, id);
    log::debug!("Deleting expense {}", id);

    super::check(gateway.send(&endpoint, RequestOptions::delete()).await?)?;

    Ok(())
}
