use std::time::Duration;

use chrono::{Local, NaiveDateTime};

use crate::config;
use crate::error::FetchError;
use crate::exchange_rate::ExchangeRateRecord;
use crate::rate_table::{AttributeAnchor, RateRow, TableLocator, find_rate_row};
use crate::source::RatePage;

pub type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: config::MAX_RETRIES,
            delay: config::RETRY_DELAY,
        }
    }
}

/// Fetches the rate page, picks one currency out of it and retries on any failure.
pub struct RateFetcher<P> {
    page: P,
    locator: Box<dyn TableLocator>,
    policy: RetryPolicy,
    clock: Clock,
    last_captured: Option<NaiveDateTime>,
}

impl<P: RatePage> RateFetcher<P> {
    pub fn new(page: P) -> Self {
        Self {
            page,
            locator: Box::new(AttributeAnchor::default()),
            policy: RetryPolicy::default(),
            clock: Box::new(|| Local::now().naive_local()),
            last_captured: None,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_locator(mut self, locator: impl TableLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Returns the current record for `code`, or `None` once every attempt has failed.
    ///
    /// All failures are retried the same way; nothing propagates to the caller.
    pub async fn fetch_current_rate(&mut self, code: &str) -> Option<ExchangeRateRecord> {
        for attempt in 1..=self.policy.max_attempts {
            match self.fetch_row(code).await {
                Ok(row) => {
                    let captured_at = self.capture_time();
                    return Some(row.into_record(captured_at));
                }
                Err(err) => {
                    log::error!("Attempt {attempt} failed: {err}");
                    log::debug!("Attempt {attempt} failure kind: {}", err.kind());
                    if attempt < self.policy.max_attempts {
                        log::info!(
                            "Retrying in {} seconds...",
                            self.policy.delay.as_secs_f64()
                        );
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
            }
        }

        log::error!("Max retries reached. Giving up.");
        None
    }

    async fn fetch_row(&self, code: &str) -> Result<RateRow, FetchError> {
        let body = self.page.load().await?;
        find_rate_row(&body, code, self.locator.as_ref())
    }

    // Wall clock may step back; stamps handed out by this fetcher must not.
    fn capture_time(&mut self) -> NaiveDateTime {
        let now = (self.clock)();
        let captured_at = match self.last_captured {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        self.last_captured = Some(captured_at);
        captured_at
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use reqwest::StatusCode;
    use rust_decimal::Decimal;

    use super::*;

    const GOOD_PAGE: &str = "<table width=\"600\" cellpadding=\"5\" cellspacing=\"1\">\
        <tr><th>Currency Name</th></tr>\
        <tr><td>USD</td><td>68000</td><td>67500</td><td>68300</td><td>68600</td><td>68150</td><td>09:30:00</td></tr>\
        </table>";

    struct ScriptedPage {
        responses: Mutex<VecDeque<Result<String, FetchError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedPage {
        fn new(responses: Vec<Result<String, FetchError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RatePage for ScriptedPage {
        async fn load(&self) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(FetchError::Status(StatusCode::SERVICE_UNAVAILABLE)))
        }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 18)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn no_delay() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn returns_record_on_first_success() {
        let mut fetcher = RateFetcher::new(ScriptedPage::new(vec![Ok(GOOD_PAGE.to_string())]))
            .with_policy(no_delay())
            .with_clock(|| at(10, 0, 0));

        let record = fetcher.fetch_current_rate("USD").await.unwrap();
        assert_eq!(record.currency_code, "USD");
        assert_eq!(record.middle_rate, Decimal::new(68150, 2));
        assert_eq!(record.published_at, "09:30:00");
        assert_eq!(record.captured_at, at(10, 0, 0));
        assert_eq!(fetcher.page.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let page = ScriptedPage::new(vec![
            Err(FetchError::Status(StatusCode::BAD_GATEWAY)),
            Ok("<html><body>maintenance</body></html>".to_string()),
            Ok(GOOD_PAGE.to_string()),
        ]);
        let mut fetcher = RateFetcher::new(page).with_policy(no_delay());

        assert!(fetcher.fetch_current_rate("USD").await.is_some());
        assert_eq!(fetcher.page.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let page = ScriptedPage::new(vec![
            Ok(GOOD_PAGE.to_string()),
            Ok(GOOD_PAGE.to_string()),
            Ok(GOOD_PAGE.to_string()),
            Ok(GOOD_PAGE.to_string()),
        ]);
        let mut fetcher = RateFetcher::new(page).with_policy(no_delay());

        // The code is missing on every attempt; the row lookup is retried anyway.
        assert!(fetcher.fetch_current_rate("EUR").await.is_none());
        assert_eq!(fetcher.page.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn negative_cell_still_yields_a_record() {
        let page = ScriptedPage::new(vec![Ok(GOOD_PAGE.replace("<td>68000</td>", "<td>-100</td>"))]);
        let mut fetcher = RateFetcher::new(page).with_policy(no_delay());

        let record = fetcher.fetch_current_rate("USD").await.unwrap();
        assert_eq!(record.buying_rate, Decimal::new(-1, 0));
        assert_eq!(fetcher.page.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn capture_time_never_goes_backwards() {
        let ticks = Mutex::new(vec![at(9, 0, 0), at(10, 0, 0)]);
        let page = ScriptedPage::new(vec![Ok(GOOD_PAGE.to_string()), Ok(GOOD_PAGE.to_string())]);
        let mut fetcher = RateFetcher::new(page)
            .with_policy(no_delay())
            .with_clock(move || ticks.lock().unwrap().pop().unwrap());

        let first = fetcher.fetch_current_rate("USD").await.unwrap();
        let second = fetcher.fetch_current_rate("USD").await.unwrap();
        assert_eq!(first.captured_at, at(10, 0, 0));
        assert_eq!(second.captured_at, at(10, 0, 0));
    }

    #[test]
    fn default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(5));
    }
}
