use anyhow::Result;
use mv_harness_core::scenario::cases_for;
use mv_harness_core::{
    matrix, ClusterManager, HarnessConfig, ScenarioCase, ScenarioKind, ScenarioRunner,
    SuiteReport,
};
use tracing::{info, warn};

use super::OutputFormat;

pub async fn run(
    config_path: &str,
    scenario: Option<&str>,
    skip_provision: bool,
    format: OutputFormat,
) -> Result<()> {
    info!("Loading configuration from: {}", config_path);
    let config = HarnessConfig::from_file(config_path)?;

    let nodes = config.scenarios.nodes;
    let cases = match scenario {
        Some(name) => cases_for(name.parse::<ScenarioKind>()?, nodes),
        None => matrix(nodes),
    };
    info!(
        "Running {} case(s) against {}",
        cases.len(),
        config.cluster.contact_point
    );

    let manager = ClusterManager::docker(config.clone())?;
    let suite = if skip_provision {
        manager.wait_until_connected().await?;
        run_cases(&manager, &config, &cases).await?
    } else {
        manager
            .with_cluster(|handle| {
                info!("Cluster ready: container {}", handle.container_id);
                run_cases(&manager, &config, &cases)
            })
            .await?
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&suite)?),
        OutputFormat::Text => println!("{}", suite),
    }

    if !suite.success() {
        warn!("{} scenario(s) failed", suite.failed());
        std::process::exit(1);
    }

    Ok(())
}

async fn run_cases(
    manager: &ClusterManager,
    config: &HarnessConfig,
    cases: &[ScenarioCase],
) -> mv_harness_core::Result<SuiteReport> {
    let store = manager.session().await?;
    let mut runner = ScenarioRunner::new(&store, config);
    Ok(runner.run_suite(cases).await)
}
