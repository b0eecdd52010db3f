use std::time::Duration;

pub const SOURCE_URL: &str = "https://www.bankofchina.com/sourcedb/whpj/enindex_1619.html";

pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
// The source rejects requests that don't look like they come from a browser.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36";
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Presentation attributes of the rate table. The page has no id or class to anchor on.
pub const TABLE_WIDTH: &str = "600";
pub const TABLE_CELLPADDING: &str = "5";
pub const TABLE_CELLSPACING: &str = "1";

pub const TARGET_CURRENCY: &str = "USD";

pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

pub const DATA_DIR: &str = "data";
pub const OUTPUT_FILE: &str = "exchange_rates.csv";
pub const LOG_FILE: &str = "boc_exchange_rate.log";
