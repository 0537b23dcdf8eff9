//! Lookup and collect command handlers.

use futures::future::join_all;
use gamerscore_core::{Gamertag, NormalizedKey};
use gamerscore_error::GamerscoreResult;
use gamerscore_lookup::{GamerscoreConfig, LookupReport, LookupService, SweeperHandle, split_tags};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// One output line for a lookup outcome.
///
/// ```
/// use gamerscore::render_report;
/// use gamerscore_core::Gamertag;
/// use gamerscore_lookup::LookupReport;
///
/// let report = LookupReport {
///     tag: Gamertag::new("Newbie"),
///     resolution: Ok(150),
///     low_score: true,
/// };
/// assert_eq!(render_report(&report), "Newbie: 150 (low gamerscore)");
/// ```
pub fn render_report(report: &LookupReport) -> String {
    match &report.resolution {
        Ok(score) if report.low_score => format!("{}: {} (low gamerscore)", report.tag, score),
        Ok(score) => format!("{}: {}", report.tag, score),
        Err(failure) => format!("{}: {}", report.tag, failure),
    }
}

fn unique_tags(args: &[String]) -> Vec<Gamertag> {
    let mut seen: HashSet<NormalizedKey> = HashSet::new();
    split_tags(&args.join(" "))
        .into_iter()
        .filter(|tag| seen.insert(tag.key().clone()))
        .collect()
}

async fn shut_down(service: &LookupService, sweeper: SweeperHandle) {
    sweeper.shutdown().await;
    if let Err(e) = service.persist().await {
        error!(error = %e, "Failed to save state on shutdown");
    }
}

/// Resolve every tag and print the results in argument order.
///
/// Ctrl-C stops outstanding lookups; state is saved either way.
pub async fn run_lookup(config: GamerscoreConfig, args: &[String]) -> GamerscoreResult<()> {
    let tags = unique_tags(args);
    if tags.is_empty() {
        warn!("No gamertags given");
        return Ok(());
    }

    let service = LookupService::start(config).await?;
    let sweeper = service.spawn_sweeper();
    let resolver = service.resolver();

    let lookups = join_all(tags.into_iter().map(|tag| async move {
        let resolution = resolver.resolve(tag.display()).await;
        LookupReport {
            tag,
            resolution,
            low_score: false,
        }
    }));

    tokio::select! {
        reports = lookups => {
            for report in &reports {
                println!("{}", render_report(report));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, saving state");
        }
    }

    shut_down(&service, sweeper).await;
    Ok(())
}

/// Run tags through the collector, printing each report as it arrives.
pub async fn run_collect(config: GamerscoreConfig, args: &[String]) -> GamerscoreResult<()> {
    let tags = split_tags(&args.join(" "));
    if tags.is_empty() {
        warn!("No gamertags given");
        return Ok(());
    }

    let service = LookupService::start(config).await?;
    let sweeper = service.spawn_sweeper();
    let collector = service.collector();

    let (tx, mut rx) = mpsc::channel::<LookupReport>(16);
    let printer = tokio::spawn(async move {
        let mut low = 0usize;
        while let Some(report) = rx.recv().await {
            if report.low_score {
                low += 1;
            }
            println!("{}", render_report(&report));
        }
        low
    });

    tokio::select! {
        sent = collector.process_batch(tags, &tx) => {
            info!(sent, "Collection finished");
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, saving state");
        }
    }
    drop(tx);

    match printer.await {
        Ok(low) => info!(low, "Low gamerscore warnings issued"),
        Err(e) => error!(error = %e, "Report printer failed"),
    }

    shut_down(&service, sweeper).await;
    Ok(())
}
