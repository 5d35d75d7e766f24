//! `weightlog` - A weight-tracking ledger with a 48-hour cooldown
//!
//! The [`ledger`] module holds the entry rules and their persistence; the
//! [`controller`] module drives them from form-style user actions. Time and
//! storage are injected through [`Clock`] and [`KeyValueStore`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod storage;
pub mod view;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use controller::{EntryForm, FormEvent, FormSettings, FormState, SubmitOutcome};
pub use error::{Error, Result};
pub use ledger::{CooldownStatus, WeightEntry, WeightInput};
pub use logging::init_logging;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
pub use view::View;
