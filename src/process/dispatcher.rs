/*!
 * Dispatcher
 * Feeds parsed commands into the scheduler and runs dispatched payloads
 *
 * Foreground work runs inline on the caller's thread. Background work runs
 * on a detached worker thread that reports completion back to the scheduler.
 */

use super::command::Command;
use super::executor::{BuiltinRunner, PayloadRunner};
use super::scheduler::Scheduler;
use super::types::{ItemClass, WorkItem};
use crate::core::errors::{PayloadError, Result};
use crate::core::types::{Ticks, WorkId};
use crate::monitoring::PayloadSpan;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info, warn};

/// What a script line did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accepted {
    Submitted { id: WorkId, class: ItemClass },
    Slept { id: WorkId, ticks: Ticks },
}

/// Result of one dispatch attempt
#[derive(Debug)]
pub enum Dispatched {
    /// Nothing was ready
    Idle,
    /// Foreground work ran to completion
    Completed {
        id: WorkId,
        output: std::result::Result<String, PayloadError>,
    },
    /// Background work handed to a worker thread
    Detached { id: WorkId, handle: JoinHandle<()> },
}

#[derive(Clone)]
pub struct Dispatcher {
    scheduler: Scheduler,
    runner: Arc<dyn PayloadRunner>,
}

impl Dispatcher {
    /// Dispatcher running the built-in payloads
    pub fn new(scheduler: Scheduler) -> Self {
        Self::with_runner(scheduler, Arc::new(BuiltinRunner::new()))
    }

    pub fn with_runner(scheduler: Scheduler, runner: Arc<dyn PayloadRunner>) -> Self {
        Self { scheduler, runner }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Parse a script line and apply it; `Ok(None)` for blank and comment lines
    pub fn handle_line(&self, line: &str) -> Result<Option<Accepted>> {
        match Command::parse(line)? {
            None => Ok(None),
            Some(command) => self.apply(command).map(Some),
        }
    }

    /// Apply a parsed command to the scheduler
    pub fn apply(&self, command: Command) -> Result<Accepted> {
        match command {
            Command::Submit { class, payload } => {
                let id = self.scheduler.submit(class, payload);
                Ok(Accepted::Submitted { id, class })
            }
            Command::Sleep { id, ticks } => {
                self.scheduler.sleep(id, ticks)?;
                Ok(Accepted::Slept { id, ticks })
            }
        }
    }

    /// Take the next ready item and run it
    pub fn dispatch_next(&self) -> Result<Dispatched> {
        let Some(item) = self.scheduler.next_to_run() else {
            return Ok(Dispatched::Idle);
        };

        match item.class() {
            ItemClass::Foreground => {
                let id = item.id();
                let output = run_payload(self.runner.as_ref(), &item);
                self.finish(id);
                Ok(Dispatched::Completed { id, output })
            }
            ItemClass::Background => self.detach(item),
        }
    }

    fn detach(&self, item: WorkItem) -> Result<Dispatched> {
        let id = item.id();
        let scheduler = self.scheduler.clone();
        let runner = Arc::clone(&self.runner);

        let spawned = thread::Builder::new()
            .name(format!("bg-{}", id))
            .spawn(move || {
                let _ = run_payload(runner.as_ref(), &item);
                if let Err(e) = scheduler.complete(id) {
                    error!(id, error = %e, "Detached completion rejected");
                }
            });

        match spawned {
            Ok(handle) => Ok(Dispatched::Detached { id, handle }),
            Err(e) => {
                // The closure (and the item) is gone; close the in-flight record
                self.finish(id);
                Err(e.into())
            }
        }
    }

    fn finish(&self, id: WorkId) {
        if let Err(e) = self.scheduler.complete(id) {
            error!(id, error = %e, "Completion rejected");
        }
    }
}

fn run_payload(runner: &dyn PayloadRunner, item: &WorkItem) -> std::result::Result<String, PayloadError> {
    let span = PayloadSpan::new(item.id(), item.class(), &item.payload().command);
    let _entered = span.enter();

    let output = runner.run(item.payload());
    span.record_result(output.is_ok());

    match &output {
        Ok(text) => info!(id = item.id(), class = ?item.class(), output = %text, "Payload finished"),
        Err(e) => warn!(id = item.id(), payload = %item.payload(), error = %e, "Payload failed"),
    }
    output
}
