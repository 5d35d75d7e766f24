//! Plain-text rendering of the entry form.

use std::fmt;

/// Page title.
pub const TITLE: &str = "Registro de Peso";

/// History section heading.
pub const HISTORY_HEADING: &str = "Historial de Pesos";

/// Placeholder of the user name field.
pub const USER_NAME_PLACEHOLDER: &str = "Nombre de usuario";

/// Placeholder of the weight field.
pub const WEIGHT_PLACEHOLDER: &str = "Ingresa tu peso (kg)";

/// Caption of the submit button.
pub const SUBMIT_LABEL: &str = "Registrar Peso";

/// Caption of the clear-all button.
pub const CLEAR_ALL_LABEL: &str = "Borrar Todos los Registros";

/// Shown instead of the history list when the ledger is empty.
pub const EMPTY_HISTORY: &str = "Aún no hay registros de peso.";

/// A snapshot of everything the form displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    /// Current content of the user name field.
    pub user_name_input: String,
    /// Current content of the weight field.
    pub weight_input: String,
    /// Message in the error slot, if any.
    pub error: Option<String>,
    /// Formatted history lines, oldest first.
    pub entries: Vec<String>,
}

impl View {
    /// Check if the history list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The history as displayed: the entry lines, or the placeholder.
    #[must_use]
    pub fn history(&self) -> Vec<&str> {
        if self.entries.is_empty() {
            vec![EMPTY_HISTORY]
        } else {
            self.entries.iter().map(String::as_str).collect()
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{TITLE}")?;
        writeln!(f)?;
        writeln!(f, "{USER_NAME_PLACEHOLDER}: {}", self.user_name_input)?;
        writeln!(f, "{WEIGHT_PLACEHOLDER}: {}", self.weight_input)?;
        writeln!(f, "[{SUBMIT_LABEL}] [{CLEAR_ALL_LABEL}]")?;

        if let Some(error) = &self.error {
            writeln!(f)?;
            writeln!(f, "{error}")?;
        }

        writeln!(f)?;
        writeln!(f, "{HISTORY_HEADING}")?;
        if self.entries.is_empty() {
            writeln!(f, "{EMPTY_HISTORY}")?;
        } else {
            for line in &self.entries {
                writeln!(f, "- {line}")?;
            }
        }
        Ok(())
    }
}
