//! Threaded driver for a [`Panel`].
//!
//! One controller thread owns the panel and selects over four inputs:
//! operator events, request completions, page queries, and the status tick.
//! Each backend request runs on its own short-lived worker thread and posts
//! its completion back, so completions apply in the order they finish.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{Receiver, Sender, bounded, select, tick, unbounded};

use super::{Completion, Effects, Panel, Request, UiEvent};
use crate::backend::Backend;
use crate::console::Reporter;
use crate::view::document::{PatchBatch, Snapshot};

/// A read of the rendered page, answered on the controller thread.
pub enum Query {
    Snapshot(Sender<Snapshot>),
    PatchesSince(u64, Sender<PatchBatch>),
}

/// Cloneable handle to a running controller.
#[derive(Clone)]
pub struct PanelHandle {
    events: Sender<UiEvent>,
    queries: Sender<Query>,
}

impl PanelHandle {
    /// Queue an operator event. Returns once queued, not once applied.
    pub fn send(&self, event: UiEvent) -> Result<()> {
        self.events
            .send(event)
            .map_err(|_| anyhow!("panel controller has stopped"))
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        let (reply, answer) = bounded(1);
        self.queries
            .send(Query::Snapshot(reply))
            .map_err(|_| anyhow!("panel controller has stopped"))?;
        answer.recv().context("panel controller dropped a snapshot query")
    }

    pub fn patches_since(&self, since: u64) -> Result<PatchBatch> {
        let (reply, answer) = bounded(1);
        self.queries
            .send(Query::PatchesSince(since, reply))
            .map_err(|_| anyhow!("panel controller has stopped"))?;
        answer.recv().context("panel controller dropped a patch query")
    }
}

/// Start the controller thread. It boots the panel immediately and polls
/// status every `poll` for as long as any handle is alive.
pub fn spawn(
    panel: Panel,
    backend: Arc<dyn Backend>,
    poll: Duration,
    reporter: Reporter,
) -> PanelHandle {
    let (events_tx, events_rx) = unbounded();
    let (queries_tx, queries_rx) = unbounded();

    thread::spawn(move || {
        Controller {
            panel,
            backend,
            reporter,
        }
        .run(events_rx, queries_rx, poll)
    });

    PanelHandle {
        events: events_tx,
        queries: queries_tx,
    }
}

struct Controller {
    panel: Panel,
    backend: Arc<dyn Backend>,
    reporter: Reporter,
}

impl Controller {
    fn run(mut self, events: Receiver<UiEvent>, queries: Receiver<Query>, poll: Duration) {
        let (done_tx, done_rx) = unbounded::<Completion>();
        let ticker = tick(poll);

        let effects = self.panel.boot();
        self.apply(effects, &done_tx);

        loop {
            select! {
                recv(events) -> event => match event {
                    Ok(event) => {
                        let effects = self.panel.handle_event(event);
                        self.apply(effects, &done_tx);
                    }
                    Err(_) => break,
                },
                recv(done_rx) -> completion => {
                    if let Ok(completion) = completion {
                        let effects = self.panel.complete(completion);
                        self.apply(effects, &done_tx);
                    }
                },
                recv(queries) -> query => match query {
                    Ok(Query::Snapshot(reply)) => {
                        let _ = reply.send(self.panel.snapshot());
                    }
                    Ok(Query::PatchesSince(since, reply)) => {
                        let _ = reply.send(self.panel.patches_since(since));
                    }
                    Err(_) => break,
                },
                recv(ticker) -> _ => {
                    let effects = self.panel.tick();
                    self.apply(effects, &done_tx);
                },
            }
        }
    }

    fn apply(&self, effects: Effects, done: &Sender<Completion>) {
        for failure in &effects.failures {
            self.reporter.report(failure);
        }
        for request in effects.requests {
            dispatch(request, Arc::clone(&self.backend), done.clone());
        }
    }
}

/// Run one request on a worker thread.
fn dispatch(request: Request, backend: Arc<dyn Backend>, done: Sender<Completion>) {
    thread::spawn(move || {
        let completion = request.execute(backend.as_ref());
        let _ = done.send(completion);
    });
}
