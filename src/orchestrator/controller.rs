//! Command loop between presentation layers and the discovery controller.
//!
//! UI layers send [`UiCommand`]s; run state flows back through the controller's watch channel
//! and finished runs are reported on the outcome channel.

use super::discovery::PhaseController;
use crate::api::{CompanyDiscoverer, JobDiscoverer};
use crate::model::RunOutcome;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;

/// Commands emitted by UI layers to control discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UiCommand {
    Start(Option<String>),
    Reset,
    Quit,
}

pub(crate) async fn run_controller<C, J>(
    controller: Arc<PhaseController<C, J>>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
    outcome_tx: UnboundedSender<RunOutcome>,
) -> Result<()>
where
    C: CompanyDiscoverer + 'static,
    J: JobDiscoverer + 'static,
{
    // Runs are not serialized here; the controller rejects a start while one is active.
    let mut runs: JoinSet<RunOutcome> = JoinSet::new();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Start(query)) => {
                        let controller = controller.clone();
                        runs.spawn(async move { controller.start(query).await });
                    }
                    Some(UiCommand::Reset) => controller.reset(),
                    Some(UiCommand::Quit) | None => {
                        runs.abort_all();
                        break;
                    }
                }
            }
            Some(done) = runs.join_next() => {
                match done {
                    Ok(outcome) => {
                        tracing::debug!(?outcome, "discovery run settled");
                        let _ = outcome_tx.send(outcome);
                    }
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => tracing::error!("discovery task failed: {e}"),
                }
            }
        }
    }

    Ok(())
}
