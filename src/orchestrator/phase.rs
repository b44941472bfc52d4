//! Discovery phase transitions.
//!
//! Every phase change in a run goes through [`DiscoveryPhase::advance`], so the legal edges
//! live in one table instead of being spread over the controller.

use crate::model::DiscoveryPhase;
use thiserror::Error;

/// Events that move a run between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    /// `start` accepted; company discovery is about to be dispatched.
    Start,
    /// Company discovery settled successfully. The phase does not change.
    CompaniesDiscovered,
    /// Job discovery is about to be dispatched.
    JobsStarted,
    /// Job discovery settled successfully.
    JobsDiscovered,
    /// A remote call failed.
    Fail,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub(crate) enum TransitionError {
    #[error("a discovery run is already active ({0:?})")]
    AlreadyRunning(DiscoveryPhase),
    #[error("cannot apply {transition:?} while {from:?}")]
    Illegal {
        from: DiscoveryPhase,
        transition: Transition,
    },
}

impl DiscoveryPhase {
    /// Apply a transition, returning the next phase or why it is not allowed here.
    pub(crate) fn advance(self, transition: Transition) -> Result<DiscoveryPhase, TransitionError> {
        use DiscoveryPhase::*;
        use Transition::*;

        match (self, transition) {
            (_, Reset) => Ok(Idle),
            (Idle, Start) => Ok(DiscoveringCompanies),
            (from, Start) => Err(TransitionError::AlreadyRunning(from)),
            (DiscoveringCompanies, CompaniesDiscovered) => Ok(DiscoveringCompanies),
            (DiscoveringCompanies, JobsStarted) => Ok(FindingJobs),
            (FindingJobs, JobsDiscovered) => Ok(Complete),
            (DiscoveringCompanies | FindingJobs, Fail) => Ok(Idle),
            (from, transition) => Err(TransitionError::Illegal { from, transition }),
        }
    }
}
