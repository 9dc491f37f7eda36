use std::{
    collections::BTreeSet,
    future::Future,
    path::{Path, PathBuf},
    time::Duration,
};

use miette::{IntoDiagnostic, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::{context::BuildContext, host::Build};

/// Rebuilds whenever one of the declared dependencies changes.
/// Runs until `shutdown` resolves and returns the number of passes.
///
/// The watcher lives for the whole loop, so changes made while a pass runs
/// stay queued and trigger the next one.
#[tracing::instrument(level = "trace", skip(build, shutdown))]
pub async fn watch<F>(build: &Build, debounce: Duration, shutdown: F) -> Result<usize>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |result: notify::Result<Event>| {
            if let Ok(event) = result {
                // the receiver is only gone once watching stopped
                let _ = tx.send(event);
            }
        },
        notify::Config::default(),
    )
    .into_diagnostic()?;
    let mut watched = BTreeSet::new();
    let mut pass = 0;

    loop {
        let mut ctx = BuildContext::new(pass);
        build.prepare(&mut ctx).await?;
        watched = update_watched(&mut watcher, watched, watch_dirs(&ctx.file_dependencies));

        let written = match build.finalize(&ctx).await {
            Ok(written) => {
                tracing::info!("pass {pass} finished, {} files written", written.len());
                written
            }
            Err(e) => {
                tracing::error!("pass {pass} failed: {e:?}");
                Vec::new()
            }
        };
        pass += 1;

        let ignored = written.into_iter().collect::<BTreeSet<_>>();
        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) if is_relevant(&event, &ignored) => {
                        tracing::info!("change detected in {:?}", event.paths);
                        break;
                    }
                    Some(event) => tracing::trace!("ignoring {event:?}"),
                    None => return Ok(pass),
                },
                _ = &mut shutdown => {
                    tracing::info!("stopping watch");
                    return Ok(pass);
                }
            }
        }

        tokio::time::sleep(debounce).await;
        // the next pass reads everything that changed up to here
        while rx.try_recv().is_ok() {}
    }
}

/// Registers new directories with the watcher and drops the ones no longer needed
fn update_watched(
    watcher: &mut RecommendedWatcher,
    current: BTreeSet<PathBuf>,
    wanted: BTreeSet<PathBuf>,
) -> BTreeSet<PathBuf> {
    for dir in current.difference(&wanted) {
        if let Err(e) = watcher.unwatch(dir) {
            tracing::debug!("cannot unwatch {}: {e}", dir.display());
        }
    }
    let mut watched = current.intersection(&wanted).cloned().collect::<BTreeSet<_>>();

    for dir in wanted.difference(&current) {
        match watcher.watch(dir, RecursiveMode::NonRecursive) {
            Ok(()) => {
                tracing::debug!("watching {}", dir.display());
                watched.insert(dir.to_owned());
            }
            Err(e) => tracing::warn!("cannot watch {}: {e}", dir.display()),
        }
    }

    watched
}

/// Directories to register with the watcher: every dependency that is a
/// directory and the parent of every other dependency
fn watch_dirs(dependencies: &[PathBuf]) -> BTreeSet<PathBuf> {
    dependencies
        .iter()
        .filter_map(|p| {
            if p.is_dir() {
                Some(p.to_owned())
            } else {
                p.parent().map(Path::to_path_buf)
            }
        })
        .collect()
}

fn is_relevant(event: &Event, ignored: &BTreeSet<PathBuf>) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && event.paths.iter().any(|p| !ignored.contains(p))
}
