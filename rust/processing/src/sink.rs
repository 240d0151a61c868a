// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Message delivery to whatever is presenting the check.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("INFO"),
            Severity::Warning => f.write_str("WARNING"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}

/// Receives user-facing messages produced by a check.
pub trait ReportSink {
    fn report(&mut self, severity: Severity, message: &str);
}

impl<F> ReportSink for F
where
    F: FnMut(Severity, &str),
{
    fn report(&mut self, severity: Severity, message: &str) {
        self(severity, message)
    }
}

/// Forwards messages as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report(&mut self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => tracing::info!(target: "clash_lite", "{}", message),
            Severity::Warning => tracing::warn!(target: "clash_lite", "{}", message),
            Severity::Error => tracing::error!(target: "clash_lite", "{}", message),
        }
    }
}

/// Collects messages in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageLog {
    pub entries: Vec<(Severity, String)>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.entries.iter().map(|(_, m)| m.as_str()).collect()
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(s, _)| *s == severity)
            .map(|(_, m)| m.as_str())
    }

    pub fn last(&self) -> Option<(Severity, &str)> {
        self.entries.last().map(|(s, m)| (*s, m.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReportSink for MessageLog {
    fn report(&mut self, severity: Severity, message: &str) {
        self.entries.push((severity, message.to_string()));
    }
}
