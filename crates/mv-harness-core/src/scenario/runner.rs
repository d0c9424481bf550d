//! Scenario runner.

use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::{error, info};

use super::script::{run_script, ScriptContext};
use super::{ScenarioCase, ScenarioReport, SuiteReport};
use crate::config::HarnessConfig;
use crate::readiness::RetryPolicy;
use crate::record::RecordGenerator;
use crate::store::ScoreStore;
use crate::{Error, Result};

/// Runs scenario scripts against a store, one at a time.
pub struct ScenarioRunner<'a, S: ScoreStore + ?Sized> {
    store: &'a S,
    settle: RetryPolicy,
    timeout: Duration,
    generator: RecordGenerator,
}

impl<'a, S: ScoreStore + ?Sized> ScenarioRunner<'a, S> {
    pub fn new(store: &'a S, config: &HarnessConfig) -> Self {
        Self {
            store,
            settle: config.settle.clone(),
            timeout: config.scenarios.timeout(),
            generator: RecordGenerator::new(),
        }
    }

    /// Replace the record generator, e.g. with a seeded one
    pub fn with_generator(mut self, generator: RecordGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Run one case, failing with the first failed check.
    pub async fn run(&mut self, case: &ScenarioCase) -> Result<ScenarioReport> {
        let (report, outcome) = self.execute(case).await;
        outcome.map(|()| report)
    }

    /// Run every case; failures are recorded in the report, not returned.
    pub async fn run_suite(&mut self, cases: &[ScenarioCase]) -> SuiteReport {
        let start_time = Utc::now();
        let started = Instant::now();

        let mut scenarios = Vec::with_capacity(cases.len());
        for case in cases {
            let (report, _) = self.execute(case).await;
            scenarios.push(report);
        }

        let suite = SuiteReport {
            start_time,
            duration_ms: started.elapsed().as_millis() as u64,
            scenarios,
        };
        info!(
            "Suite finished: {} passed, {} failed",
            suite.passed(),
            suite.failed()
        );
        suite
    }

    async fn execute(&mut self, case: &ScenarioCase) -> (ScenarioReport, Result<()>) {
        let start_time = Utc::now();
        let started = Instant::now();
        let keyspace = self.generator.keyspace_name();

        info!(
            "Running {} in keyspace {} (cluster config: nodes={})",
            case, keyspace, case.params.nodes
        );

        let mut ctx = ScriptContext::new(self.store, &self.settle, keyspace.clone());
        let outcome = match tokio::time::timeout(
            self.timeout,
            run_script(case, &mut ctx, &mut self.generator),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!(
                "{} did not finish within {:?}",
                case, self.timeout
            ))),
        };

        let report = ScenarioReport {
            scenario: case.kind,
            label: case.to_string(),
            params: case.params,
            keyspace,
            start_time,
            duration_ms: started.elapsed().as_millis() as u64,
            checks_passed: ctx.checks,
            success: outcome.is_ok(),
            error: outcome.as_ref().err().map(|e| e.to_string()),
        };

        match &outcome {
            Ok(()) => info!(
                "{} passed ({} checks in {} ms)",
                case, report.checks_passed, report.duration_ms
            ),
            Err(e) => error!("{} failed: {}", case, e),
        }

        (report, outcome)
    }
}
