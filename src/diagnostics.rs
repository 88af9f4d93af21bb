//! Informational and warning messages produced while syncing
//!
//! Every message is logged through `tracing` and also kept, in order, so
//! library callers can inspect what happened during one extract/apply call.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

/// A single diagnostic message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.severity {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
        };
        write!(f, "{}: {}", prefix, self.message)
    }
}

/// Collector for the diagnostics of one operation
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{}", message);
        self.entries.push(Diagnostic {
            severity: Severity::Info,
            message,
        });
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            message,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_in_order() {
        let mut diags = Diagnostics::new();
        diags.info("opening");
        diags.warn("row 3 has no name");
        diags.info("done");

        assert_eq!(diags.entries().len(), 3);
        assert_eq!(diags.warnings().count(), 1);
        assert_eq!(
            diags.entries()[1].to_string(),
            "Warning: row 3 has no name"
        );
    }
}
