use super::EndpointError;
use crate::{
    finance::Listing, FixedExpense, Gateway, NewFixedExpense, RequestOptions,
};
use reqwest::Method;

const FIXED_EXPENSES: &str = "/finance/fixed-expenses/";

pub async fn get_fixed_expenses(
    gateway: &Gateway,
) -> Result<Vec<FixedExpense>, EndpointError> {
    let listing: Listing<FixedExpense> =
        super::fetch(gateway, FIXED_EXPENSES, RequestOptions::get()).await?;

    Ok(listing.into_vec())
}

/// Register a recurring monthly expense. The budget's totals change as a
/// result, so re-fetch it afterwards.
pub async fn add_fixed_expense(
    gateway: &Gateway,
    expense: &NewFixedExpense,
) -> Result<FixedExpense, EndpointError> {
    log::debug!("Adding the fixed expense \"{}\"", expense.name);

    let options = RequestOptions::json(Method::POST, expense)?;
    super::fetch(gateway, FIXED_EXPENSES, options).await
}

pub async fn delete_fixed_expense(
    gateway: &Gateway,
    id: u64,
) -> Result<(), EndpointError> {
    let endpoint = format!("{}{}/", FIXED_EXPENSES, id);
    log::debug!("Deleting fixed expense {}", id);

    super::check(gateway.send(&endpoint, RequestOptions::delete()).await?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, FakeTransport};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn list_a_plain_array() {
        let transport = FakeTransport::new();
        transport.on(
            Method::GET,
            FIXED_EXPENSES,
            200,
            json!([
                { "id": 1, "name": "Rent", "amount": "450000.00" },
                { "id": 2, "name": "Internet", "amount": 25990 },
            ]),
        );
        let gateway = testing::gateway(&transport).await;

        let got = get_fixed_expenses(&gateway).await.unwrap();

        let names: Vec<&str> = got.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Internet"]);
        assert_eq!(got[0].amount, 450_000.0);
    }

    #[tokio::test]
    async fn add_a_fixed_expense() {
        let transport = FakeTransport::new();
        transport.on(
            Method::POST,
            FIXED_EXPENSES,
            201,
            json!({ "id": 3, "name": "Gym", "amount": 30000 }),
        );
        let gateway = testing::gateway(&transport).await;
        let expense = NewFixedExpense {
            name: String::from("Gym"),
            amount: 30_000,
        };

        let got = add_fixed_expense(&gateway, &expense).await.unwrap();

        assert_eq!(got.id, 3);
        let sent = transport.requests().pop().unwrap();
        let body: Value = serde_json::from_slice(&sent.body.unwrap()).unwrap();
        assert_eq!(body, json!({ "name": "Gym", "amount": 30000 }));
    }

    #[tokio::test]
    async fn delete_a_fixed_expense() {
        let transport = FakeTransport::new();
        transport.on(
            Method::DELETE,
            "/finance/fixed-expenses/3/",
            204,
            json!(null),
        );
        let gateway = testing::gateway(&transport).await;

        delete_fixed_expense(&gateway, 3).await.unwrap();
    }
}
