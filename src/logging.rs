use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use env_logger::{Env, Target};

use crate::exchange_rate::TIMESTAMP_FORMAT;

/// Installs the process logger: `time - LEVEL - message` lines on stderr and in `log_file`.
///
/// Level defaults to `info`; `RUST_LOG` overrides it.
pub fn init(log_file: impl AsRef<Path>) -> Result<()> {
    let log_file = log_file.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Can't open log file {}", log_file.display()))?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                Local::now().format(TIMESTAMP_FORMAT),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(Tee::new(io::stderr(), file))))
        .try_init()
        .context("Logger is already initialized")?;

    Ok(())
}

/// Writes everything to both sinks.
struct Tee<A, B> {
    console: A,
    file: B,
}

impl<A: Write, B: Write> Tee<A, B> {
    fn new(console: A, file: B) -> Self {
        Self { console, file }
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    // Both sides are always attempted; a closed console must not cost the file its line.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let console = self.console.write_all(buf);
        let file = self.file.write_all(buf);
        console.and(file)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let console = self.console.flush();
        let file = self.file.flush();
        console.and(file)
    }
}
