//! Samples the Bank of China exchange-rate board for one currency and appends it
//! to a tab-separated history file.

pub mod config;
pub mod error;
pub mod exchange_rate;
pub mod fetcher;
pub mod logging;
pub mod rate_table;
pub mod sink;
pub mod source;

pub use error::{FailureKind, FetchError};
pub use exchange_rate::ExchangeRateRecord;
pub use fetcher::{RateFetcher, RetryPolicy};
pub use rate_table::{AttributeAnchor, TableLocator};
pub use sink::{RecordSink, TsvSink};
pub use source::{HttpRatePage, RatePage};

/// One fetch-and-store cycle. Returns the record that was stored, if any.
///
/// Failures are logged; none are returned.
pub async fn run_once<P: RatePage>(
    fetcher: &mut RateFetcher<P>,
    sink: &mut impl RecordSink,
    code: &str,
) -> Option<ExchangeRateRecord> {
    let Some(record) = fetcher.fetch_current_rate(code).await else {
        log::error!("Failed to fetch exchange rate data");
        return None;
    };

    log::info!(
        "{} Exchange Rate (Middle Rate): {}",
        record.currency_code,
        record.middle_rate
    );

    match sink.append(&record) {
        Ok(()) => Some(record),
        Err(err) => {
            log::error!("Can't save exchange rate data: {err}");
            None
        }
    }
}
