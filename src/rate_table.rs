use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use scraper::{ElementRef, Html};

use crate::config;
use crate::error::FetchError;
use crate::exchange_rate::{ExchangeRateRecord, parse_scaled_rate};

/// Column holding the publication time; columns 1..=5 are the rates.
const PUB_TIME_COLUMN: usize = 6;

/// Finds the rate table inside a parsed page.
pub trait TableLocator: Send + Sync {
    fn locate<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>>;
}

/// Matches the first `<table>` carrying all of the given attribute values.
#[derive(Debug, Clone)]
pub struct AttributeAnchor {
    attrs: Vec<(String, String)>,
}

impl AttributeAnchor {
    pub fn new<K, V>(attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            attrs: attrs
                .into_iter()
                .map(|(k, v)| (k.into().to_ascii_lowercase(), v.into()))
                .collect(),
        }
    }

    fn matches(&self, table: &ElementRef<'_>) -> bool {
        self.attrs
            .iter()
            .all(|(name, value)| table.value().attr(name) == Some(value.as_str()))
    }
}

impl Default for AttributeAnchor {
    fn default() -> Self {
        Self::new([
            ("width", config::TABLE_WIDTH),
            ("cellpadding", config::TABLE_CELLPADDING),
            ("cellspacing", config::TABLE_CELLSPACING),
        ])
    }
}

impl TableLocator for AttributeAnchor {
    fn locate<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        elements_named(doc.root_element(), "table").find(|table| self.matches(table))
    }
}

/// One currency row as published, before it is stamped with a capture time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRow {
    pub currency_code: String,
    pub rates: [Decimal; 5],
    pub published_at: String,
}

impl RateRow {
    pub fn into_record(self, captured_at: NaiveDateTime) -> ExchangeRateRecord {
        let [buying, cash_buying, selling, cash_selling, middle] = self.rates;
        ExchangeRateRecord {
            currency_code: self.currency_code,
            buying_rate: buying,
            cash_buying_rate: cash_buying,
            selling_rate: selling,
            cash_selling_rate: cash_selling,
            middle_rate: middle,
            published_at: self.published_at,
            captured_at,
        }
    }
}

/// Locates the table in `body` and parses the first data row whose code cell equals `code`.
///
/// The first row of the table is the header and is never considered.
pub fn find_rate_row(
    body: &str,
    code: &str,
    locator: &dyn TableLocator,
) -> Result<RateRow, FetchError> {
    let doc = Html::parse_document(body);
    let table = locator.locate(&doc).ok_or(FetchError::TableNotFound)?;

    for row in elements_named(table, "tr").skip(1) {
        let cells: Vec<String> = elements_named(row, "td")
            .map(|el| el.text().collect::<String>())
            .collect();

        match cells.first() {
            Some(first) if first.trim() == code => return parse_row(code, &cells),
            _ => continue,
        }
    }

    Err(FetchError::RowNotFound {
        code: code.to_string(),
    })
}

fn parse_row(code: &str, cells: &[String]) -> Result<RateRow, FetchError> {
    if cells.len() <= PUB_TIME_COLUMN {
        return Err(FetchError::MissingCell {
            index: PUB_TIME_COLUMN,
            found: cells.len(),
        });
    }

    let mut rates = [Decimal::ZERO; 5];
    for (i, rate) in rates.iter_mut().enumerate() {
        let column = i + 1;
        *rate = parse_scaled_rate(&cells[column], column)?;
    }

    Ok(RateRow {
        currency_code: code.to_string(),
        rates,
        published_at: cells[PUB_TIME_COLUMN].trim().to_string(),
    })
}

fn elements_named<'a>(
    root: ElementRef<'a>,
    name: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == name)
}
