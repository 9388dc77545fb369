//! tasksched init command implementation
//!
//! Creates the task store and a default config file when they are missing.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::Context;
use crate::config::Config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(Serialize)]
struct InitReport {
    store: PathBuf,
    config: PathBuf,
    created: InitCreated,
}

#[derive(Serialize)]
struct InitCreated {
    store: bool,
    config: bool,
}

pub fn run(ctx: &Context, output: OutputOptions) -> Result<()> {
    let created_store = ctx.repo.store().init()?;
    let created_config = ensure_config(ctx)?;

    let report = InitReport {
        store: ctx.repo.store().path().to_path_buf(),
        config: ctx.config_path.clone(),
        created: InitCreated {
            store: created_store,
            config: created_config,
        },
    };

    let header = if created_store || created_config {
        "tasksched initialized"
    } else {
        "tasksched already initialized"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("Store", report.store.display().to_string());
    human.push_summary("Config", report.config.display().to_string());
    let mut created_items = Vec::new();
    if created_store {
        created_items.push("store");
    }
    if created_config {
        created_items.push("config");
    }
    if !created_items.is_empty() {
        human.push_summary("Created", created_items.join(", "));
    }
    human.push_next_step("tasksched add \"First task\"");

    emit_success(output, "init", &report, Some(&human))
}

fn ensure_config(ctx: &Context) -> Result<bool> {
    if ctx.config_path.exists() {
        return Ok(false);
    }
    let mut config = Config::default();
    config.store.path = ctx.repo.store().path().to_path_buf();
    config.save(&ctx.config_path)?;
    tracing::info!(path = %ctx.config_path.display(), "wrote default config");
    Ok(true)
}
