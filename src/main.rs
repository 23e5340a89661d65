/*!
 * dqsched - Main Entry Point
 *
 * Feeds a command script (or stdin) to the dispatcher while the monitor task
 * ticks the scheduler and prints reports, then drains the ready queue one item
 * per tick until everything has finished or Ctrl+C is pressed.
 */

use dqsched::monitoring::sink_for;
use dqsched::process::Dispatched;
use dqsched::{init_tracing, Config, Dispatcher, MonitorTask, Scheduler};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> miette::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.trace_json);

    info!("dqsched starting...");
    info!(config = %serde_json::to_string(&config).unwrap_or_default(), "Configuration loaded");

    let scheduler = Scheduler::from_config(&config);
    let dispatcher = Dispatcher::new(scheduler.clone());
    let monitor = MonitorTask::spawn(
        scheduler.clone(),
        config.tick_interval,
        sink_for(config.report),
    );

    let script = std::env::args().nth(1);
    let fed = tokio::select! {
        result = feed_script(&dispatcher, script.as_deref(), config.submit_delay) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    match fed {
        Some(Ok(lines)) => {
            info!(lines, "Script submitted");
            tokio::select! {
                _ = drain(&dispatcher, config.tick_interval) => info!("All work finished"),
                _ = tokio::signal::ctrl_c() => warn!("Interrupted while draining"),
            }
        }
        Some(Err(e)) => {
            monitor.shutdown().await;
            return Err(e.into());
        }
        None => warn!("Interrupted while reading script"),
    }

    monitor.shutdown().await;
    println!("{}", scheduler.snapshot());
    info!(stats = ?scheduler.stats(), "dqsched exiting");
    Ok(())
}

/// Submit every line of the script; returns the number of lines read
async fn feed_script(
    dispatcher: &Dispatcher,
    path: Option<&str>,
    delay: Duration,
) -> dqsched::Result<usize> {
    match path {
        Some(path) => {
            info!(path, "Reading command script");
            let file = tokio::fs::File::open(path).await?;
            feed_lines(dispatcher, BufReader::new(file), delay).await
        }
        None => {
            info!("Reading commands from stdin");
            feed_lines(dispatcher, BufReader::new(tokio::io::stdin()), delay).await
        }
    }
}

async fn feed_lines<R>(dispatcher: &Dispatcher, reader: R, delay: Duration) -> dqsched::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut count = 0;

    while let Some(line) = lines.next_line().await? {
        count += 1;
        // Bad lines are the script author's problem, not a reason to stop
        if let Err(e) = dispatcher.handle_line(&line) {
            warn!(line = count, error = %e, "Rejected command");
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
    Ok(count)
}

/// Dispatch one ready item per tick until the scheduler is idle
async fn drain(dispatcher: &Dispatcher, period: Duration) {
    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;
        if dispatcher.scheduler().is_idle() {
            break;
        }

        let worker = dispatcher.clone();
        match tokio::task::spawn_blocking(move || worker.dispatch_next()).await {
            Ok(Ok(Dispatched::Detached { id, .. })) => info!(id, "Background job detached"),
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!(error = %e, "Dispatch failed"),
            Err(e) => error!(error = %e, "Dispatch task panicked"),
        }
    }
}
