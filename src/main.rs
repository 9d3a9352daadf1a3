// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Prodwatch entry point - demo process, name resolution check and config dump.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::warn;

use prodwatch::config::{self, AgentConfig, FileConfig, LogFormat};
use prodwatch::demo::demo_registry;
use prodwatch::runtime::SymbolRegistry;
use prodwatch::telemetry::{init_telemetry, TelemetryConfig};
use prodwatch::types::{CallArgs, Value};
use prodwatch::VERSION;

/// Prodwatch - watch live functions on demand.
#[derive(Parser)]
#[command(name = "prodwatch")]
#[command(author, version, about = "Watch live functions on demand", long_about = None)]
struct Cli {
    /// Prodwatch server URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Application name reported to the server
    #[arg(short, long, global = true)]
    app_name: Option<String>,

    /// Seconds between poll cycles
    #[arg(long, global = true)]
    poll_interval: Option<u64>,

    /// Log level or filter directive
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format (text or json)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for prodwatch.
#[derive(Subcommand)]
enum Commands {
    /// Run the demo process with the agent attached
    Run {
        /// Number of demo calls (runs forever if omitted)
        #[arg(short = 'n', long)]
        iterations: Option<u64>,

        /// Seconds between demo calls
        #[arg(long, default_value_t = 5)]
        every: u64,
    },

    /// Resolve a name against the demo scopes and print the finder result
    Resolve {
        /// Dotted name, e.g. calculator.calculate_sum or Account.balance
        name: String,
    },

    /// Show the resolved configuration
    Config,
}

impl Cli {
    fn overrides(&self) -> FileConfig {
        FileConfig {
            base_url: self.base_url.clone(),
            app_name: self.app_name.clone(),
            poll_interval_secs: self.poll_interval,
            log_level: self.log_level.clone(),
            log_format: self.log_format,
            log_file: self.log_file.clone(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let workspace_root = std::env::current_dir()?;
    let config = config::load_config(&workspace_root, cli.overrides())?;

    match cli.command {
        Commands::Run { iterations, every } => {
            let _telemetry = init_telemetry(&TelemetryConfig::from_agent_config(&config))?;
            run_demo(&config, iterations, Duration::from_secs(every)).await
        }
        Commands::Resolve { name } => {
            let registry = demo_registry();
            let result = prodwatch::resolve(registry.as_ref(), &name);
            let label = if result.found() {
                format!("found ({})", result.function_type()).green()
            } else {
                "not found".yellow()
            };
            println!("{} {}", name.bold(), label);
            println!("{}", serde_json::to_string_pretty(&result.to_report())?);
            Ok(())
        }
        Commands::Config => {
            println!("{} {}", "prodwatch".bold(), VERSION);
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
            Ok(())
        }
    }
}

async fn run_demo(config: &AgentConfig, iterations: Option<u64>, every: Duration) -> anyhow::Result<()> {
    let registry = demo_registry();
    let agent = prodwatch::start_with_config(config, registry.clone()).await;
    match &agent {
        Some(agent) => println!(
            "{} process {} as '{}'",
            "Registered".green(),
            agent.process_id(),
            agent.app_name()
        ),
        None => println!("{}", "Running without prodwatch".yellow()),
    }

    let Some(calculator) = registry.scope("calculator") else {
        anyhow::bail!("demo registry has no calculator scope");
    };

    let mut i: u64 = 0;
    while iterations.map_or(true, |n| i < n) {
        let a = ((i * 37 + 11) % 101) as i64;
        let b = ((i * 53 + 7) % 101) as i64;
        println!("{} calculate_sum with {} and {}", "Calling".cyan(), a, b);
        if let Err(err) = calculator
            .call("calculate_sum", CallArgs::new([Value::from(a), Value::from(b)]))
            .await
        {
            warn!(error = %err, "calculate_sum failed");
        }
        i += 1;

        tokio::select! {
            _ = tokio::time::sleep(every) => {}
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    if let Some(agent) = agent {
        agent.stop().await;
    }
    Ok(())
}
