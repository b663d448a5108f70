//! Optional file log of scheduling decisions, enabled with `Configuration::with_log`.

use std::fs::File;

use anyhow::Context;
use time::{format_description::parse_borrowed, OffsetDateTime, UtcOffset};
use tracing::Level;
use tracing_subscriber::fmt::{time::OffsetTime, writer::BoxMakeWriter};

const TIMESTAMP_FORMAT: &str = "[year]-[month]-[day] [hour]:[minute]:[second]";
const FILE_STAMP_FORMAT: &str = "[year]-[month]-[day]_[hour]-[minute]-[second]";
const FILE_SUFFIX: &str = "_courts_log.txt";

/// Installs a global subscriber writing every event, down to `TRACE`, to a new file named
/// after the local start time in the current directory.
///
/// # Errors
/// Fails if the file cannot be created or another global subscriber is already set.
pub fn init_logger() -> anyhow::Result<()> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let path = log_file_name(OffsetDateTime::now_utc().to_offset(offset))?;
    let file = File::create(&path).with_context(|| format!("could not create log file {path}"))?;

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::TRACE)
        .with_ansi(false)
        .with_timer(OffsetTime::new(offset, parse_borrowed::<2>(TIMESTAMP_FORMAT)?))
        .with_writer(BoxMakeWriter::new(file))
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("a global tracing subscriber is already set, disable file logging to keep it")
}

fn log_file_name(started: OffsetDateTime) -> anyhow::Result<String> {
    let stamp = started.format(&parse_borrowed::<2>(FILE_STAMP_FORMAT)?)?;
    Ok(format!("{stamp}{FILE_SUFFIX}"))
}
