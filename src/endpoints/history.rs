use super::EndpointError;
use crate::{finance::Listing, Gateway, HistoryPeriod, RequestOptions};

const HISTORY: &str = "/finance/history/";

/// List the closed budget periods, newest first.
pub async fn get_history(
    gateway: &Gateway,
) -> Result<Vec<HistoryPeriod>, EndpointError> {
    let listing: Listing<HistoryPeriod> =
        super::fetch(gateway, HISTORY, RequestOptions::get()).await?;

    Ok(listing.into_vec())
}

/// Download the PDF statement the backend generates for a closed period.
pub async fn download_history_pdf(
    gateway: &Gateway,
    id: u64,
) -> Result<Vec<u8>, EndpointError> {
    let endpoint = format!("{}{}/pdf/", HISTORY, id);
    log::debug!("Downloading the statement for period {}", id);

    let response =
        super::check(gateway.send(&endpoint, RequestOptions::get()).await?)?;
    log::debug!("Received a {} byte statement", response.body.len());

    Ok(response.body)
}

/// The name a downloaded statement is saved under.
pub fn pdf_file_name(id: u64) -> String { format!("cartola_{}.pdf", id) }
