use anyhow::Result;
use mv_harness_core::{ClusterManager, HarnessConfig};
use tracing::info;

fn manager(config_path: &str) -> Result<ClusterManager> {
    info!("Loading configuration from: {}", config_path);
    let config = HarnessConfig::from_file(config_path)?;
    Ok(ClusterManager::docker(config)?)
}

pub async fn up(config_path: &str) -> Result<()> {
    let manager = manager(config_path)?;
    let handle = manager.provision().await?;

    println!("Container:     {}", handle.container_id.0);
    println!("Contact point: {}", handle.contact_point);
    Ok(())
}

pub async fn down(config_path: &str) -> Result<()> {
    let manager = manager(config_path)?;
    let removed = manager.destroy().await;

    println!(
        "Removed {} container(s) of {}",
        removed,
        manager.config().cluster.image
    );
    Ok(())
}

pub async fn wait(config_path: &str) -> Result<()> {
    let manager = manager(config_path)?;
    manager.wait_until_connected().await?;

    println!("{} accepts CQL sessions", manager.config().cluster.contact_point);
    Ok(())
}
