//! Stagehand CLI - advances Notion projects to their next stage once
//! every task in the current stage is checked off.

use clap::Parser;
use stagehand::advance::StageAdvancer;
use stagehand::config::Config;
use stagehand::store::NotionStore;
use std::process;

/// Version string with the build metadata injected by build.rs.
const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("STAGEHAND_GIT_COMMIT"),
    ", built ",
    env!("STAGEHAND_BUILD_TIMESTAMP"),
    ")"
);

/// One pass over the projects database: advance every project whose
/// current stage has all tasks done.
#[derive(Parser)]
#[command(name = "stagehand")]
#[command(version = VERSION, about = "Advance Notion project stages when all current-stage tasks are done", long_about = None)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();

    println!("🚀 stagehand {VERSION}");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("💥 Critical error: {e}");
            process::exit(1);
        }
    };
    println!("🔑 Token found: {}...", config.token_preview());

    let store = NotionStore::new(&config.token);
    let summary = StageAdvancer::new(&store, &config).run_once();

    println!(
        "✅ Check finished: {} projects checked, {} advanced, {} in progress, {} not advanced, {} skipped, {} failed",
        summary.checked,
        summary.advanced,
        summary.in_progress,
        summary.not_advanced,
        summary.skipped,
        summary.failed
    );
}
