use anyhow::Result;
use mv_harness_core::config::parse_contact_point;
use mv_harness_core::HarnessConfig;
use tracing::info;

pub fn run(config_path: &str) -> Result<()> {
    info!("Validating configuration from: {}", config_path);

    // from_file runs validate()
    let config = HarnessConfig::from_file(config_path)?;
    let (host, port) = parse_contact_point(&config.cluster.contact_point)?;

    println!("Configuration OK: {}", config_path);
    println!();
    println!("Cluster:");
    println!("  Image:           {}", config.cluster.image);
    println!("  Network mode:    {}", config.cluster.network_mode);
    println!("  Contact point:   {}:{}", host, port);
    for (key, value) in &config.cluster.env {
        println!("  Env:             {}={}", key, value);
    }
    if !config.cluster.args.is_empty() {
        println!("  Args:            {}", config.cluster.args.join(" "));
    }
    println!(
        "Readiness:         {}-{} ms backoff, {} s deadline",
        config.readiness.initial_delay_ms,
        config.readiness.max_delay_ms,
        config.readiness.timeout_secs
    );
    println!(
        "Settle:            {}-{} ms backoff, {} s deadline",
        config.settle.initial_delay_ms, config.settle.max_delay_ms, config.settle.timeout_secs
    );
    println!(
        "Schema:            replication factor {}, writes at {:?}",
        config.schema.replication_factor, config.schema.write_consistency
    );
    println!(
        "Scenarios:         {} s timeout, nodes={}",
        config.scenarios.timeout_secs, config.scenarios.nodes
    );

    Ok(())
}
