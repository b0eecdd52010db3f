use anyhow::Result;
use boc_rate::config::{DATA_DIR, LOG_FILE, OUTPUT_FILE, SOURCE_URL, TARGET_CURRENCY};
use boc_rate::{HttpRatePage, RateFetcher, TsvSink, logging, run_once};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init(LOG_FILE)?;

    log::info!("Fetching {TARGET_CURRENCY} exchange rate from Bank of China...");

    let page = HttpRatePage::new(SOURCE_URL)?;
    let mut fetcher = RateFetcher::new(page);
    let mut sink = TsvSink::new(DATA_DIR, OUTPUT_FILE);

    // A failed run only shows up in the log; the exit status stays 0.
    run_once(&mut fetcher, &mut sink, TARGET_CURRENCY).await;

    Ok(())
}
