//! The entry form controller.
//!
//! [`EntryForm`] owns the in-memory ledger and the pending input fields, and
//! turns user actions into ledger calls. It is either idle or blocked with a
//! message:
//!
//! ```text
//!            submit ok / clear_all
//!   +------+ <-------------------- +---------+
//!   | Idle |                       | Blocked |
//!   +------+ --------------------> +---------+
//!            invalid weight / cooldown
//! ```
//!
//! Field changes never move between the two states.

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::ledger::{
    self, can_add_weight_with, create_weight_entry, parse_weight, CooldownStatus, EntryFormat,
    WeightEntry, COOLDOWN_HOURS,
};
use crate::storage::KeyValueStore;
use crate::view::View;

/// Shown when the weight field does not hold a usable number.
pub const INVALID_WEIGHT_MESSAGE: &str = "Por favor, ingresa un peso válido.";

/// Message shown while the cooldown is running.
#[must_use]
pub fn cooldown_message(hours_remaining: u32) -> String {
    format!("Debes esperar {hours_remaining} horas más para registrar un nuevo peso.")
}

/// Rules a form runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSettings {
    /// Minimum interval between two entries.
    pub cooldown: Duration,
    /// How history lines are rendered.
    pub entry_format: EntryFormat,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            cooldown: Duration::hours(i64::from(COOLDOWN_HOURS)),
            entry_format: EntryFormat::default(),
        }
    }
}

/// Whether the error slot is showing something.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    /// No error shown.
    #[default]
    Idle,
    /// A submission was refused.
    Blocked {
        /// The message in the error slot.
        message: String,
    },
}

/// Result of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The entry was appended at `index`.
    Added {
        /// Position of the new entry in the ledger.
        index: usize,
    },
    /// The weight field did not hold a usable number.
    InvalidWeight,
    /// The last entry is too recent.
    Cooldown {
        /// Whole hours left, rounded up.
        hours_remaining: u32,
    },
}

/// State changes, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// The ledger was read from the store.
    Loaded {
        /// Number of entries read.
        count: usize,
    },
    /// An entry was appended.
    EntryAdded {
        /// Position of the new entry.
        index: usize,
        /// Whether the store accepted the rewrite.
        persisted: bool,
    },
    /// A submission was refused.
    Blocked {
        /// The message shown.
        message: String,
    },
    /// The ledger was emptied and its key removed.
    Cleared {
        /// Whether the store accepted the removal.
        persisted: bool,
    },
    /// The ledger was replaced wholesale.
    Imported {
        /// Number of entries now in the ledger.
        count: usize,
        /// Whether the store accepted the rewrite.
        persisted: bool,
    },
}

/// The weight entry form.
#[derive(Debug)]
pub struct EntryForm<S, C> {
    store: S,
    clock: C,
    settings: FormSettings,
    entries: Vec<WeightEntry>,
    weight_input: String,
    user_name_input: String,
    state: FormState,
    events: Vec<FormEvent>,
}

impl<S: KeyValueStore, C: Clock> EntryForm<S, C> {
    /// Mount a form with default settings.
    pub fn mount(store: S, clock: C) -> Self {
        Self::mount_with(store, clock, FormSettings::default())
    }

    /// Mount a form: read the ledger and the last used name from `store`.
    pub fn mount_with(store: S, clock: C, settings: FormSettings) -> Self {
        let entries = ledger::load_weights(&store);
        let user_name_input = ledger::load_user_name(&store).unwrap_or_default();
        let count = entries.len();

        info!(count, "Entry form mounted");
        Self {
            store,
            clock,
            settings,
            entries,
            weight_input: String::new(),
            user_name_input,
            state: FormState::Idle,
            events: vec![FormEvent::Loaded { count }],
        }
    }

    /// Try to record the pending weight.
    pub fn submit(&mut self) -> SubmitOutcome {
        if let Err(err) = parse_weight(self.weight_input.as_str()) {
            debug!(error = %err, "Rejected weight input");
            self.block(INVALID_WEIGHT_MESSAGE.to_string());
            return SubmitOutcome::InvalidWeight;
        }

        let now = self.clock.now();
        let status = can_add_weight_with(&self.entries, now, self.settings.cooldown);
        if !status.can_add {
            debug!(hours_remaining = status.hours_remaining, "Cooldown active");
            self.block(cooldown_message(status.hours_remaining));
            return SubmitOutcome::Cooldown {
                hours_remaining: status.hours_remaining,
            };
        }

        let entry = match create_weight_entry(
            self.weight_input.as_str(),
            &self.user_name_input,
            now,
        ) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(error = %err, "Rejected weight input");
                self.block(INVALID_WEIGHT_MESSAGE.to_string());
                return SubmitOutcome::InvalidWeight;
            }
        };

        self.entries.push(entry);
        let index = self.entries.len() - 1;
        let persisted = ledger::save_weights(&mut self.store, &self.entries);
        if !persisted {
            warn!(index, "Entry kept in memory only");
        }

        self.weight_input.clear();
        self.state = FormState::Idle;
        info!(index, "Weight recorded");
        self.events.push(FormEvent::EntryAdded { index, persisted });
        SubmitOutcome::Added { index }
    }

    /// Empty the ledger and remove its key from the store.
    ///
    /// Returns whether the store accepted the removal.
    pub fn clear_all(&mut self) -> bool {
        self.entries.clear();
        let persisted = ledger::clear_weights(&mut self.store);
        self.state = FormState::Idle;
        info!(persisted, "All weights cleared");
        self.events.push(FormEvent::Cleared { persisted });
        persisted
    }

    /// Replace the whole ledger, as when importing a file.
    ///
    /// Returns whether the store accepted the rewrite.
    pub fn replace_entries(&mut self, entries: Vec<WeightEntry>) -> bool {
        self.entries = entries;
        let persisted = ledger::save_weights(&mut self.store, &self.entries);
        self.state = FormState::Idle;

        let count = self.entries.len();
        info!(count, persisted, "Ledger replaced");
        self.events.push(FormEvent::Imported { count, persisted });
        persisted
    }

    /// Set the weight field.
    pub fn change_weight_input(&mut self, value: impl Into<String>) {
        self.weight_input = value.into();
    }

    /// Set the user name field, remembering it when it is not blank.
    pub fn change_user_name_input(&mut self, value: impl Into<String>) {
        self.user_name_input = value.into();
        if !self.user_name_input.trim().is_empty() {
            ledger::save_user_name(&mut self.store, &self.user_name_input);
        }
    }

    /// Cooldown status as of the clock's current instant.
    #[must_use]
    pub fn cooldown_status(&self) -> CooldownStatus {
        can_add_weight_with(&self.entries, self.clock.now(), self.settings.cooldown)
    }

    /// Snapshot of what the form displays.
    #[must_use]
    pub fn render(&self) -> View {
        View {
            user_name_input: self.user_name_input.clone(),
            weight_input: self.weight_input.clone(),
            error: self.error().map(str::to_string),
            entries: self
                .entries
                .iter()
                .map(|entry| self.settings.entry_format.format(Some(entry)))
                .collect(),
        }
    }

    fn block(&mut self, message: String) {
        self.state = FormState::Blocked {
            message: message.clone(),
        };
        self.events.push(FormEvent::Blocked { message });
    }
}

impl<S, C> EntryForm<S, C> {
    /// The ledger, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[WeightEntry] {
        &self.entries
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// The message in the error slot, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FormState::Idle => None,
            FormState::Blocked { message } => Some(message),
        }
    }

    /// Current content of the weight field.
    #[must_use]
    pub fn weight_input(&self) -> &str {
        &self.weight_input
    }

    /// Current content of the user name field.
    #[must_use]
    pub fn user_name_input(&self) -> &str {
        &self.user_name_input
    }

    /// The settings this form runs with.
    #[must_use]
    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Take the events recorded since the last call.
    pub fn take_events(&mut self) -> Vec<FormEvent> {
        std::mem::take(&mut self.events)
    }

    /// Unmount the form, handing back its store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }
}
