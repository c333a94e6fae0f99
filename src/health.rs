//! Health classification of service records

use std::fmt;
use std::process::ExitCode;

use regex::Regex;

use crate::errors::{CheckError, Result};
use crate::services::ServiceRecord;

/// Check result in the Nagios/Sensu exit code convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    Warning,
    Critical,
    /// The check itself could not complete
    Unknown,
}

impl Verdict {
    pub fn exit_code(self) -> u8 {
        match self {
            Verdict::Ok => 0,
            Verdict::Warning => 1,
            Verdict::Critical => 2,
            Verdict::Unknown => 3,
        }
    }

    /// Join two verdicts, keeping the more severe one.
    pub fn escalate(self, other: Verdict) -> Verdict {
        if other.exit_code() > self.exit_code() {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ok => write!(f, "OK"),
            Verdict::Warning => write!(f, "WARNING"),
            Verdict::Critical => write!(f, "CRITICAL"),
            Verdict::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl From<Verdict> for ExitCode {
    fn from(verdict: Verdict) -> Self {
        ExitCode::from(verdict.exit_code())
    }
}

/// Disabled reasons that should raise an alert.
///
/// Patterns are searched anywhere in the reason, not anchored.
#[derive(Debug, Clone, Default)]
pub struct ReasonMatcher {
    patterns: Vec<Regex>,
}

impl ReasonMatcher {
    /// Compile all patterns, failing on the first one that is invalid.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|source| CheckError::Pattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn matches(&self, reason: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(reason))
    }
}

/// Administrative side of a record's health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admin<'a> {
    Enabled,
    Disabled { reason: Option<&'a str> },
    /// A status value the check does not know how to judge
    Unrecognized,
    /// The family has no enable/disable concept, only liveness
    NotTracked,
}

impl<'a> Admin<'a> {
    /// Map an `enabled`/`disabled` status string.
    pub fn from_status(status: &str, reason: Option<&'a str>) -> Self {
        match status {
            "enabled" => Admin::Enabled,
            "disabled" => Admin::Disabled { reason },
            _ => Admin::Unrecognized,
        }
    }
}

/// Inputs to the health predicate, extracted from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition<'a> {
    pub admin: Admin<'a>,
    pub alive: bool,
}

/// Why a record escalated the verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cause {
    /// Enabled but not reporting
    Down,
    /// Disabled with a reason matching a critical pattern
    DisabledReason(String),
    /// Liveness-only record that is not alive
    NotAlive,
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Down => write!(f, "enabled but down"),
            Cause::DisabledReason(reason) => write!(f, "disabled: {}", reason),
            Cause::NotAlive => write!(f, "not alive"),
        }
    }
}

impl Condition<'_> {
    pub fn assess(&self, reasons: &ReasonMatcher) -> Option<Cause> {
        match self.admin {
            Admin::Enabled if !self.alive => Some(Cause::Down),
            Admin::Disabled {
                reason: Some(reason),
            } if reasons.matches(reason) => Some(Cause::DisabledReason(reason.to_string())),
            Admin::NotTracked if !self.alive => Some(Cause::NotAlive),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Position of the record in the evaluated slice
    pub index: usize,
    pub label: String,
    pub cause: Cause,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub checked: usize,
    pub findings: Vec<Finding>,
}

impl Evaluation {
    fn empty() -> Self {
        Self {
            verdict: Verdict::Ok,
            checked: 0,
            findings: Vec::new(),
        }
    }

    pub fn is_flagged(&self, index: usize) -> bool {
        self.findings.iter().any(|finding| finding.index == index)
    }

    /// One-line diagnostic for the check output.
    pub fn summary(&self, family: &str) -> String {
        if self.findings.is_empty() {
            return format!("{} {} services healthy", self.checked, family);
        }

        let details = self
            .findings
            .iter()
            .map(|finding| format!("{}: {}", finding.label, finding.cause))
            .collect::<Vec<_>>()
            .join("; ");

        format!(
            "{} of {} {} services unhealthy: {}",
            self.findings.len(),
            self.checked,
            family,
            details
        )
    }
}

/// Order records by sort key for display. The sort is stable.
pub fn sort_records<R: ServiceRecord>(records: &mut [R]) {
    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Classify every record; a single unhealthy one makes the check critical.
pub fn evaluate<R: ServiceRecord>(records: &[R], reasons: &ReasonMatcher) -> Evaluation {
    records
        .iter()
        .enumerate()
        .fold(Evaluation::empty(), |mut acc, (index, record)| {
            acc.checked += 1;
            if let Some(cause) = record.condition().assess(reasons) {
                acc.verdict = acc.verdict.escalate(Verdict::Critical);
                acc.findings.push(Finding {
                    index,
                    label: record.label(),
                    cause,
                });
            }
            acc
        })
}
