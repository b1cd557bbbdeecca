use super::EndpointError;
use crate::{Budget, BudgetUpdate, Gateway, RequestOptions};
use reqwest::Method;

const BUDGET: &str = "/finance/budget/";

/// Get the current budget cycle and its totals.
pub async fn get_budget(gateway: &Gateway) -> Result<Budget, EndpointError> {
    super::fetch(gateway, BUDGET, RequestOptions::get()).await
}

/// Change the income, savings goal or cycle start. The backend answers with
/// the recalculated budget.
pub async fn update_budget(
    gateway: &Gateway,
    update: &BudgetUpdate,
) -> Result<Budget, EndpointError> {
    log::debug!("Updating the budget to {:?}", update);

    let options = RequestOptions::json(Method::PUT, update)?;
    super::fetch(gateway, BUDGET, options).await
}
