use std::borrow::Cow;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::exchange_rate::{ExchangeRateRecord, format_rate};

pub const HEADER: [&str; 8] = [
    "Currency Name",
    "Buying Rate",
    "Cash Buying Rate",
    "Selling Rate",
    "Cash Selling Rate",
    "Middle Rate",
    "Pub Time",
    "Timestamp",
];

const DELIMITER: char = '\t';
const LINE_END: &str = "\r\n";

/// Destination for fetched records. Appending the same record twice writes it twice.
pub trait RecordSink {
    fn append(&mut self, record: &ExchangeRateRecord) -> io::Result<()>;
}

/// Append-only tab-separated file under a data directory.
///
/// Assumes a single writing process; nothing locks the file.
#[derive(Debug, Clone)]
pub struct TsvSink {
    dir: PathBuf,
    path: PathBuf,
}

impl TsvSink {
    pub fn new(dir: impl Into<PathBuf>, file_name: impl AsRef<Path>) -> Self {
        let dir = dir.into();
        let path = dir.join(file_name);
        Self { dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for TsvSink {
    fn append(&mut self, record: &ExchangeRateRecord) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let file_exists = self.path.is_file();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut out = String::new();
        if !file_exists {
            out.push_str(&join_line(HEADER.iter().map(|h| Cow::Borrowed(*h))));
        }
        out.push_str(&format_row(record));

        file.write_all(out.as_bytes())?;
        file.flush()?;

        log::info!("Exchange rate data saved to {}", self.path.display());
        Ok(())
    }
}

/// One data line, `\r\n` included.
pub fn format_row(record: &ExchangeRateRecord) -> String {
    let mut fields: Vec<Cow<'_, str>> = Vec::with_capacity(HEADER.len());
    fields.push(Cow::Borrowed(record.currency_code.as_str()));
    fields.extend(record.rates().into_iter().map(|r| Cow::Owned(format_rate(r))));
    fields.push(Cow::Borrowed(record.published_at.as_str()));
    fields.push(Cow::Owned(record.captured_at_text()));
    join_line(fields)
}

fn join_line<'a>(fields: impl IntoIterator<Item = Cow<'a, str>>) -> String {
    let mut line = fields
        .into_iter()
        .map(|f| quote_field(&f).into_owned())
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string());
    line.push_str(LINE_END);
    line
}

// Quote only when the value would otherwise break the row, doubling inner quotes.
fn quote_field(field: &str) -> Cow<'_, str> {
    if field.contains([DELIMITER, '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
