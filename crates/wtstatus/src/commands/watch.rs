use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::ArgMatches;
use tokio_util::sync::CancellationToken;
use tracing::info;

use wtstatus_config::StatusConfig;
use wtstatus_core::{
    ChannelObserver, GitStatusSnapshot, InvalidationBus, SubscribeOptions, Subscription,
    VisibilitySignal,
};

use super::helpers::{build_runtime, build_store, load_config, resolve_workspace};
use crate::shutdown::wait_for_shutdown_signal;
use crate::table;
use crate::watcher::{EventFilter, WorkspaceWatcher};

/// What `watch` was asked to do, resolved from flags and config.
struct WatchPlan {
    workspaces: Vec<String>,
    options: SubscribeOptions,
    json_output: bool,
    use_watcher: bool,
    config: StatusConfig,
}

pub(crate) fn handle_watch_command(
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let workspaces = matches
        .get_many::<String>("paths")
        .ok_or("At least one path is required")?
        .map(|path| resolve_workspace(path))
        .collect::<Result<Vec<_>, _>>()?;
    let config = load_config(matches)?;

    let mut options = SubscribeOptions::new().active(!matches.get_flag("passive"));
    if let Some(ms) = matches.get_one::<u64>("interval-ms") {
        options = options.poll_interval(Duration::from_millis(*ms));
    }

    let plan = WatchPlan {
        workspaces,
        options,
        json_output: matches.get_flag("json"),
        use_watcher: config.watch.enabled() && !matches.get_flag("no-watch"),
        config,
    };

    info!(
        event = "cli.watch.started",
        workspaces = plan.workspaces.len(),
        active = plan.options.is_active.unwrap_or(true),
        use_watcher = plan.use_watcher
    );

    let runtime = build_runtime()?;
    runtime.block_on(run_watch(plan))?;

    info!(event = "cli.watch.stopped");
    Ok(())
}

async fn run_watch(plan: WatchPlan) -> Result<(), Box<dyn std::error::Error>> {
    let visibility = VisibilitySignal::default();
    let invalidations = InvalidationBus::default();
    let store = build_store(
        &plan.config,
        plan.config.git.include_diff(),
        &visibility,
        &invalidations,
    )?;

    let (observer, mut snapshots) = ChannelObserver::new();
    let subscriptions: Vec<Subscription> = plan
        .workspaces
        .iter()
        .map(|workspace| store.subscribe(workspace.as_str(), observer.clone(), plan.options))
        .collect();
    // The store holds its own clones; ours would keep the channel open forever.
    drop(observer);

    let debounce = Duration::from_millis(plan.config.watch.debounce_ms());
    let _watchers: Vec<WorkspaceWatcher> = if plan.use_watcher {
        plan.workspaces
            .iter()
            .filter_map(|workspace| {
                let filter =
                    EventFilter::new(Path::new(workspace), plan.config.filter.internal_dir());
                WorkspaceWatcher::start(workspace, filter, invalidations.clone(), debounce)
            })
            .collect()
    } else {
        Vec::new()
    };

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_shutdown_signal(shutdown.clone()));

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = snapshots.recv() => match received {
                Some(snapshot) => print_snapshot(&snapshot, plan.json_output)?,
                None => break,
            },
        }
    }

    for subscription in subscriptions {
        subscription.unsubscribe();
    }
    Ok(())
}

fn print_snapshot(
    snapshot: &Arc<GitStatusSnapshot>,
    json_output: bool,
) -> Result<(), serde_json::Error> {
    if json_output {
        println!("{}", serde_json::to_string(&**snapshot)?);
    } else {
        println!("{}", table::render_snapshot(snapshot));
    }
    Ok(())
}
