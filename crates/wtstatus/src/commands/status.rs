use clap::ArgMatches;
use tracing::{error, info};

use wtstatus_core::{InvalidationBus, VisibilitySignal};

use super::helpers::{build_runtime, build_store, load_config, resolve_workspace};
use crate::color;
use crate::table;

pub(crate) fn handle_status_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = matches
        .get_one::<String>("path")
        .ok_or("Path argument is required")?;
    let json_output = matches.get_flag("json");

    let workspace = resolve_workspace(path)?;
    let config = load_config(matches)?;
    let include_diff = config.git.include_diff() && !matches.get_flag("no-diff");

    info!(
        event = "cli.status_started",
        workspace = %workspace,
        json_output = json_output,
        include_diff = include_diff
    );

    let runtime = build_runtime()?;
    let snapshot = runtime.block_on(async {
        let store = build_store(
            &config,
            include_diff,
            &VisibilitySignal::default(),
            &InvalidationBus::default(),
        )?;
        Ok::<_, wtstatus_core::StoreError>(store.refresh_git_status(&workspace, false).await)
    })?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    } else {
        println!("{}", table::render_snapshot(&snapshot));
    }

    if let Some(ref message) = snapshot.error {
        if !json_output {
            eprintln!("{} {}", color::error("Error:"), message);
        }
        error!(
            event = "cli.status_failed",
            workspace = %workspace,
            error = message.as_str()
        );
        return Err(message.clone().into());
    }

    info!(
        event = "cli.status_completed",
        workspace = %workspace,
        changes = snapshot.changes.len()
    );
    Ok(())
}
