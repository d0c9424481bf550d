use anyhow::Result;
use mv_harness_core::{matrix, ScenarioKind};

use super::OutputFormat;

pub fn run(nodes: u32, format: OutputFormat) -> Result<()> {
    let cases = matrix(nodes);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&cases)?);
        }
        OutputFormat::Text => {
            for kind in ScenarioKind::ALL {
                println!("{}:", kind);
                for case in cases.iter().filter(|c| c.kind == kind) {
                    println!("  - {}", case);
                }
            }
            println!("\n{} case(s)", cases.len());
        }
    }

    Ok(())
}
