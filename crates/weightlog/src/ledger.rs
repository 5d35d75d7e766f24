//! The weight ledger: entry rules and persistence.
//!
//! Everything here is a plain function over a slice of entries, an explicit
//! instant, or an injected [`KeyValueStore`]. Nothing reads the wall clock.
//!
//! The persisted form is a JSON array under [`WEIGHTS_KEY`]:
//!
//! ```json
//! [{"weight": 70.5, "userName": "Juan", "date": "2025-06-27T10:00:00.000Z"}]
//! ```

use std::fmt::Write as _;

use chrono::{DateTime, Duration, Local, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;

/// Store key holding the JSON-encoded ledger.
pub const WEIGHTS_KEY: &str = "userWeights";

/// Store key holding the last user name typed into the form.
pub const USER_NAME_KEY: &str = "userName";

/// Minimum interval between two entries, in hours.
pub const COOLDOWN_HOURS: u32 = 48;

/// Returned by the formatters when a record cannot be displayed.
pub const INVALID_ENTRY: &str = "Registro inválido";

/// Default `strftime` pattern for entry dates (`27/6/2025, 12:00:00`).
pub const DEFAULT_DATE_FORMAT: &str = "%-d/%-m/%Y, %H:%M:%S";

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// A single recorded weight.
///
/// Entries cannot be changed once built. Build them with
/// [`create_weight_entry`] or [`WeightEntry::recorded_at`]; deserialization
/// applies the same weight check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredEntry")]
pub struct WeightEntry {
    weight: f64,
    user_name: String,
    #[serde(serialize_with = "serialize_iso_millis")]
    date: DateTime<Utc>,
}

/// Wire shape of an entry before the weight is checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredEntry {
    weight: f64,
    #[serde(default)]
    user_name: String,
    date: DateTime<Utc>,
}

impl TryFrom<StoredEntry> for WeightEntry {
    type Error = Error;

    fn try_from(raw: StoredEntry) -> Result<Self> {
        Self::recorded_at(raw.weight, &raw.user_name, raw.date)
    }
}

impl WeightEntry {
    /// Build an entry for a known instant.
    ///
    /// The name is trimmed and `date` is truncated to whole milliseconds,
    /// the precision of the stored form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWeight`] if `weight` is not a positive finite number.
    pub fn recorded_at(weight: f64, user_name: &str, date: DateTime<Utc>) -> Result<Self> {
        let weight = parse_weight(weight)?;
        Ok(Self {
            weight,
            user_name: user_name.trim().to_string(),
            date: date.trunc_subsecs(3),
        })
    }

    /// The weight in kilograms.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The name recorded with the entry, possibly empty.
    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// When the entry was recorded.
    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

fn serialize_iso_millis<S: Serializer>(
    date: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// A candidate weight as typed by the user or passed by code.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightInput {
    /// Nothing was supplied.
    Missing,
    /// A numeric value.
    Number(f64),
    /// Text that should hold a number.
    Text(String),
}

impl From<f64> for WeightInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for WeightInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for WeightInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<WeightInput>> From<Option<T>> for WeightInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// Outcome of the cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownStatus {
    /// Whether a new entry may be recorded now.
    pub can_add: bool,
    /// Whole hours left before the next entry, rounded up. Zero when allowed.
    pub hours_remaining: u32,
}

impl CooldownStatus {
    const ALLOWED: Self = Self {
        can_add: true,
        hours_remaining: 0,
    };
}

/// Check a candidate weight.
///
/// Accepts numbers and numeric strings (surrounding whitespace ignored).
///
/// # Errors
///
/// Returns [`Error::InvalidWeight`] when the input is missing, empty, not a
/// number, not finite, or not greater than zero.
pub fn parse_weight(input: impl Into<WeightInput>) -> Result<f64> {
    let (value, raw) = match input.into() {
        WeightInput::Missing => (None, String::new()),
        WeightInput::Number(n) => (Some(n), n.to_string()),
        WeightInput::Text(text) => (text.trim().parse::<f64>().ok(), text),
    };

    match value {
        Some(n) if n.is_finite() && n > 0.0 => Ok(n),
        _ => Err(Error::invalid_weight(raw)),
    }
}

/// Check whether a new entry may be recorded at `now` under the 48-hour rule.
#[must_use]
pub fn can_add_weight(entries: &[WeightEntry], now: DateTime<Utc>) -> CooldownStatus {
    can_add_weight_with(entries, now, Duration::hours(i64::from(COOLDOWN_HOURS)))
}

/// Check whether a new entry may be recorded at `now` with a custom window.
///
/// Only the last entry in `entries` is considered.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn can_add_weight_with(
    entries: &[WeightEntry],
    now: DateTime<Utc>,
    cooldown: Duration,
) -> CooldownStatus {
    let Some(last) = entries.last() else {
        return CooldownStatus::ALLOWED;
    };

    let elapsed_hours = (now - last.date).num_milliseconds() as f64 / MILLIS_PER_HOUR;
    let cooldown_hours = cooldown.num_milliseconds() as f64 / MILLIS_PER_HOUR;

    if elapsed_hours >= cooldown_hours {
        return CooldownStatus::ALLOWED;
    }

    CooldownStatus {
        can_add: false,
        hours_remaining: (cooldown_hours - elapsed_hours).ceil() as u32,
    }
}

/// Build a new entry stamped with `now`, truncated to milliseconds.
///
/// # Errors
///
/// Returns [`Error::InvalidWeight`] if the weight does not pass [`parse_weight`].
pub fn create_weight_entry(
    weight: impl Into<WeightInput>,
    user_name: &str,
    now: DateTime<Utc>,
) -> Result<WeightEntry> {
    WeightEntry::recorded_at(parse_weight(weight)?, user_name, now)
}

/// How entry dates are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFormat {
    /// `strftime` pattern for the date.
    pub date_format: String,
    /// Render in the local time zone instead of UTC.
    pub local_time: bool,
}

impl Default for EntryFormat {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            local_time: true,
        }
    }
}

impl EntryFormat {
    /// Render an entry as a history line, or [`INVALID_ENTRY`] when absent.
    #[must_use]
    pub fn format(&self, entry: Option<&WeightEntry>) -> String {
        let Some(entry) = entry else {
            return INVALID_ENTRY.to_string();
        };

        let mut line = String::new();
        if !entry.user_name.is_empty() {
            let _ = write!(line, "Usuario: {} - ", entry.user_name);
        }
        let _ = write!(
            line,
            "Peso: {} kg - Fecha: {}",
            entry.weight,
            self.format_date(entry.date)
        );
        line
    }

    fn format_date(&self, date: DateTime<Utc>) -> String {
        let mut out = String::new();
        let written = if self.local_time {
            write!(out, "{}", date.with_timezone(&Local).format(&self.date_format))
        } else {
            write!(out, "{}", date.format(&self.date_format))
        };

        // A bad pattern makes chrono's formatter fail instead of printing.
        if written.is_err() {
            return date.to_rfc3339_opts(SecondsFormat::Secs, true);
        }
        out
    }
}

/// Render an entry with the default date format.
///
/// Never fails: an absent entry yields [`INVALID_ENTRY`].
#[must_use]
pub fn format_weight_entry(entry: Option<&WeightEntry>) -> String {
    EntryFormat::default().format(entry)
}

/// Render a raw stored record.
///
/// Records missing a usable weight or date yield [`INVALID_ENTRY`].
#[must_use]
pub fn format_stored_entry(record: &serde_json::Value) -> String {
    let entry = WeightEntry::deserialize(record).ok();
    format_weight_entry(entry.as_ref())
}

/// Read the ledger from `store`.
///
/// Absent, unreadable, or corrupt data yields an empty ledger. Failures are
/// logged, never returned.
pub fn load_weights<S: KeyValueStore + ?Sized>(store: &S) -> Vec<WeightEntry> {
    let raw = match store.get(WEIGHTS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(err) => {
            error!(error = %err, "Failed to read weights from store");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Option<Vec<WeightEntry>>>(&raw) {
        Ok(entries) => {
            let entries = entries.unwrap_or_default();
            debug!(count = entries.len(), "Loaded weights");
            entries
        }
        Err(err) => {
            error!(error = %err, "Failed to parse stored weights");
            Vec::new()
        }
    }
}

/// Rewrite the whole ledger in `store`.
///
/// Returns `false` if the write failed; the failure is logged.
pub fn save_weights<S: KeyValueStore + ?Sized>(store: &mut S, entries: &[WeightEntry]) -> bool {
    let result = serde_json::to_string(entries)
        .map_err(Error::from)
        .and_then(|json| store.set(WEIGHTS_KEY, &json));

    match result {
        Ok(()) => {
            debug!(count = entries.len(), "Saved weights");
            true
        }
        Err(err) => {
            error!(error = %err, "Failed to save weights to store");
            false
        }
    }
}

/// Remove the ledger key from `store` entirely.
///
/// Returns `false` if the delete failed; the failure is logged.
pub fn clear_weights<S: KeyValueStore + ?Sized>(store: &mut S) -> bool {
    match store.remove(WEIGHTS_KEY) {
        Ok(()) => true,
        Err(err) => {
            error!(error = %err, "Failed to remove weights from store");
            false
        }
    }
}

/// Read the last used name, if one was saved.
pub fn load_user_name<S: KeyValueStore + ?Sized>(store: &S) -> Option<String> {
    match store.get(USER_NAME_KEY) {
        Ok(name) => name,
        Err(err) => {
            error!(error = %err, "Failed to read user name from store");
            None
        }
    }
}

/// Remember `name` as the last used name.
///
/// Returns `false` if the write failed; the failure is logged.
pub fn save_user_name<S: KeyValueStore + ?Sized>(store: &mut S, name: &str) -> bool {
    match store.set(USER_NAME_KEY, name) {
        Ok(()) => true,
        Err(err) => {
            error!(error = %err, "Failed to save user name to store");
            false
        }
    }
}

/// Parse a ledger supplied from outside (an import file).
///
/// Unlike [`load_weights`], this is strict: the first bad record rejects the
/// whole document, and entries must be in chronological order.
///
/// # Errors
///
/// Returns [`Error::Json`] if the document is not a JSON array and
/// [`Error::Import`] naming the first offending record otherwise.
pub fn parse_ledger(json: &str) -> Result<Vec<WeightEntry>> {
    let records: Vec<serde_json::Value> = serde_json::from_str(json)?;
    let mut entries: Vec<WeightEntry> = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let entry = WeightEntry::deserialize(record)
            .map_err(|err| Error::import(format!("record {index}: {err}")))?;

        if let Some(previous) = entries.last() {
            if entry.date < previous.date {
                return Err(Error::import(format!(
                    "record {index}: dated {} before the previous entry",
                    entry.date.to_rfc3339_opts(SecondsFormat::Millis, true)
                )));
            }
        }
        entries.push(entry);
    }

    Ok(entries)
}
