use itertools::Itertools;
use std::{error::Error as StdError, fmt, time::Duration};
use tenancy::{blue, error::Error, formatted_duration_rate, record::Field};
use crate::error::ProvisionError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    MissingField(Field),
    AlreadyExists,
    NoSuchTenant,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingField(field) => write!(f, "missing required field {}", field),
            SkipReason::AlreadyExists       => f.write_str("already exists"),
            SkipReason::NoSuchTenant        => f.write_str("no such tenant on the system"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Created,
    Updated,
}

///
/// What happened to a single record (or alias).
///
#[derive(Debug)]
pub enum Outcome {
    Skipped(SkipReason),

    /// The tenant was created or updated, then optionally configured and given logos.
    Provisioned { action: Action, configured: bool, logos: bool },

    /// Configuration was applied to an existing tenant.
    Configured,

    Failed(Error),
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

///
/// Tallies every outcome of a run. Failures keep their error so they can be reported once the run
/// is over.
///
#[derive(Debug, Default)]
pub struct Summary {
    total: usize,
    created: usize,
    updated: usize,
    configured: usize,
    logos: usize,
    skipped: usize,
    not_attempted: usize,
    failures: Vec<(String, Error)>,
    elapsed: Duration,
}

impl Summary {
    pub fn new(total: usize) -> Self {
        Self { total, ..Default::default() }
    }

    pub fn record(&mut self, label: String, outcome: Outcome) {
        match outcome {
            Outcome::Skipped(reason) => {
                log::info!("Skipping {} - {}", label, reason);
                self.skipped += 1;
            },
            Outcome::Provisioned { action, configured, logos } => {
                match action {
                    Action::Created => self.created += 1,
                    Action::Updated => self.updated += 1,
                }
                if configured {
                    self.configured += 1;
                }
                if logos {
                    self.logos += 1;
                }
            },
            Outcome::Configured => self.configured += 1,
            Outcome::Failed(err) => self.failures.push((label, err)),
        }
    }

    pub fn mark_not_attempted(&mut self) {
        self.not_attempted += 1;
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn updated(&self) -> usize {
        self.updated
    }

    pub fn configured(&self) -> usize {
        self.configured
    }

    pub fn logos(&self) -> usize {
        self.logos
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn failures(&self) -> &[(String, Error)] {
        &self.failures
    }

    pub fn aborted(&self) -> bool {
        self.not_attempted > 0
    }

    pub fn not_attempted(&self) -> usize {
        self.not_attempted
    }

    ///
    /// Write the failures and the final tallies to the log.
    ///
    pub fn log(&self) {
        for (label, err) in &self.failures {
            log::error!("{} failed: {}", label, err);
            let mut source = StdError::source(err);
            while let Some(cause) = source {
                log::error!("  caused by: {}", cause);
                source = cause.source();
            }
        }

        let (duration, rate) = formatted_duration_rate(self.total, self.elapsed);

        log::info!("{} records in {} ({}/record)", self.total, blue(&duration), rate);
        log::info!("   Created: {}", self.created);
        log::info!("   Updated: {}", self.updated);
        log::info!("Configured: {}", self.configured);
        log::info!("     Logos: {}", self.logos);
        log::info!("   Skipped: {}", self.skipped);
        match self.failures.is_empty() {
            true  => log::info!("    Failed: 0"),
            false => log::info!("    Failed: {} ({})", self.failed(), self.failures.iter().map(|(label, _)| label).join(", ")),
        }

        if self.aborted() {
            log::warn!("Aborted with {} records not processed", self.not_attempted);
        }
    }

    ///
    /// Turn a run with any failures into an error for the caller's exit status.
    ///
    pub fn ensure_success(&self) -> Result<(), ProvisionError> {
        if self.aborted() {
            return Err(ProvisionError::Aborted { not_attempted: self.not_attempted })
        }

        match self.failures.is_empty() {
            true  => Ok(()),
            false => Err(ProvisionError::RecordsFailed { failed: self.failed() }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn remote_error() -> Error {
        Error::RemoteStatus { operation: "Creating tenant acme".into(), status: 500, body: "boom".into() }
    }

    #[test]
    fn test_tallies() {
        let mut summary = Summary::new(5);
        summary.record("acme".into(), Outcome::Provisioned { action: Action::Created, configured: true, logos: true });
        summary.record("beta".into(), Outcome::Provisioned { action: Action::Updated, configured: false, logos: false });
        summary.record("gamma".into(), Outcome::Skipped(SkipReason::AlreadyExists));
        summary.record("delta".into(), Outcome::Configured);
        summary.record("zeta".into(), Outcome::Failed(remote_error()));

        assert_eq!(summary.created(), 1);
        assert_eq!(summary.updated(), 1);
        assert_eq!(summary.configured(), 2);
        assert_eq!(summary.logos(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.failed(), 1);
        assert!(matches!(summary.ensure_success(), Err(ProvisionError::RecordsFailed { failed: 1 })));
    }

    #[test]
    fn test_abort_takes_precedence() {
        let mut summary = Summary::new(3);
        summary.record("acme".into(), Outcome::Failed(remote_error()));
        summary.mark_not_attempted();
        summary.mark_not_attempted();

        assert!(summary.aborted());
        assert!(matches!(summary.ensure_success(), Err(ProvisionError::Aborted { not_attempted: 2 })));
    }

    #[test]
    fn test_clean_run_succeeds() {
        let mut summary = Summary::new(1);
        summary.record("acme".into(), Outcome::Skipped(SkipReason::MissingField(Field::Hostname)));
        assert!(summary.ensure_success().is_ok());
        assert_eq!(SkipReason::MissingField(Field::Hostname).to_string(), "missing required field hostname");
    }
}
