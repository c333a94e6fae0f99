//! Check orchestration: authenticate, list, evaluate, render

use reqwest::Client;
use tokio::time::timeout;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{CheckError, Result};
use crate::health::{Evaluation, ReasonMatcher, Verdict, evaluate, sort_records};
use crate::openstack::{self, ServiceClient, Session};
use crate::report::{Report, verdict_line};
use crate::services::baremetal::Conductor;
use crate::services::clustering::ClusteringService;
use crate::services::compute::ComputeService;
use crate::services::container::ContainerService;
use crate::services::network::NetworkAgent;
use crate::services::orchestration::OrchestrationService;
use crate::services::share::ShareService;
use crate::services::volume::VolumeService;
use crate::services::{ServiceFamily, ServiceRecord};

/// Result of one completed check.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub family: ServiceFamily,
    pub evaluation: Evaluation,
    pub report: Report,
}

impl CheckOutcome {
    pub fn summary(&self) -> String {
        self.evaluation.summary(self.family.name())
    }
}

/// What one invocation prints on stdout and the verdict it exits with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub output: String,
    pub verdict: Verdict,
}

impl Completion {
    /// The check could not complete: only the UNKNOWN line is printed.
    pub fn failed(err: &CheckError) -> Self {
        error!("Check failed: {}", err);
        Self {
            output: verdict_line(Verdict::Unknown, &err.to_string()),
            verdict: Verdict::Unknown,
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.verdict.exit_code()
    }
}

impl From<CheckOutcome> for Completion {
    /// The table comes first, the verdict line last.
    fn from(outcome: CheckOutcome) -> Self {
        let verdict = outcome.evaluation.verdict;
        Self {
            output: format!(
                "{}\n{}",
                outcome.report.table(),
                verdict_line(verdict, &outcome.summary())
            ),
            verdict,
        }
    }
}

/// Validate, run under the deadline and render, mapping every failure to UNKNOWN.
///
/// Patterns are compiled before any network call.
pub async fn execute(config: &Config) -> Completion {
    let reasons = match config.validate() {
        Ok(reasons) => reasons,
        Err(e) => return Completion::failed(&e),
    };

    match run_with_deadline(config, &reasons).await {
        Ok(outcome) => outcome.into(),
        Err(e) => Completion::failed(&e),
    }
}

/// Run the check under the configured overall deadline.
///
/// Elapsing the deadline drops the in-flight request and fails the check.
pub async fn run_with_deadline(config: &Config, reasons: &ReasonMatcher) -> Result<CheckOutcome> {
    let deadline = config.deadline();
    let span = info_span!("check", id = %Uuid::new_v4(), service = %config.service);

    timeout(deadline, run(config, reasons))
        .instrument(span)
        .await
        .map_err(|_| CheckError::Timeout(deadline))?
}

pub async fn run(config: &Config, reasons: &ReasonMatcher) -> Result<CheckOutcome> {
    let cloud = openstack::load_cloud(&config.cloud, config.os_config_file.as_deref())?;
    let http = openstack::http_client(&cloud)?;
    let session = openstack::authenticate(&http, &cloud).await?;

    match config.service {
        ServiceFamily::Compute => {
            check_family::<ComputeService>(config, http, &session, reasons).await
        }
        ServiceFamily::Volume => {
            check_family::<VolumeService>(config, http, &session, reasons).await
        }
        ServiceFamily::Share => {
            check_family::<ShareService>(config, http, &session, reasons).await
        }
        ServiceFamily::Network => {
            check_family::<NetworkAgent>(config, http, &session, reasons).await
        }
        ServiceFamily::Orchestration => {
            check_family::<OrchestrationService>(config, http, &session, reasons).await
        }
        ServiceFamily::Container => {
            check_family::<ContainerService>(config, http, &session, reasons).await
        }
        ServiceFamily::Clustering => {
            check_family::<ClusteringService>(config, http, &session, reasons).await
        }
        ServiceFamily::Baremetal => {
            check_family::<Conductor>(config, http, &session, reasons).await
        }
    }
}

async fn check_family<R: ServiceRecord>(
    config: &Config,
    http: Client,
    session: &Session,
    reasons: &ReasonMatcher,
) -> Result<CheckOutcome> {
    let client = ServiceClient::for_record::<R>(http, session)?;
    info!("Listing {} services from {}", config.service, client.endpoint());

    let mut records = client.list::<R>().await?;
    sort_records(&mut records);

    let evaluation = evaluate(&records, reasons);
    debug!(
        "Evaluated {} records against {} reason patterns: {}",
        evaluation.checked,
        reasons.len(),
        evaluation.verdict
    );

    let report = Report::new(&records, &evaluation);

    Ok(CheckOutcome {
        family: config.service,
        evaluation,
        report,
    })
}
