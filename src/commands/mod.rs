//! CLI command implementations, one module per resource.

pub mod events;
pub mod notes;
pub mod plans;
pub mod search;
pub mod status;
pub mod tasks;

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::core::config::DataPaths;
use crate::store::Store;

/// Open the store under the resolved data root, creating it if missing.
pub(crate) fn open_store() -> Result<Store> {
    let paths = DataPaths::resolve()?;
    paths.ensure_dirs()?;
    Store::open(&paths.db_path())
}

/// Parse a user-supplied date/time: RFC 3339, `YYYY-MM-DD HH:MM`, or a bare
/// `YYYY-MM-DD` (midnight UTC).
pub(crate) fn parse_datetime_arg(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).unwrap();
        return Ok(Utc.from_utc_datetime(&midnight));
    }
    bail!("unrecognized date/time: {s} (expected RFC 3339, 'YYYY-MM-DD HH:MM', or 'YYYY-MM-DD')")
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M").to_string()
}
