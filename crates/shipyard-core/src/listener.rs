//! Workflow listeners.
//!
//! Listeners observe the run through [`ContextView`] snapshots. Dispatch is
//! sequential and stops at the first listener that fails.

use std::fmt;

use crate::error::ListenerError;
use crate::model::packagers::PackagerKind;
use crate::view::ContextView;

/// Packager phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagerPhase {
    /// Generating files.
    Prepare,
    /// Building the package.
    Package,
    /// Publishing it.
    Publish,
}

impl fmt::Display for PackagerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prepare => "prepare",
            Self::Package => "package",
            Self::Publish => "publish",
        })
    }
}

/// Something that happened during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The run started.
    SessionStart,
    /// The run finished.
    SessionEnd {
        /// The run failed.
        failed: bool,
    },
    /// A workflow step started.
    StepStart {
        /// Step name.
        step: String,
    },
    /// A workflow step finished.
    StepEnd {
        /// Step name.
        step: String,
        /// The step failed.
        failed: bool,
    },
    /// Work on a distribution started.
    DistributionStart {
        /// Distribution name.
        distribution: String,
    },
    /// Work on a distribution finished.
    DistributionEnd {
        /// Distribution name.
        distribution: String,
    },
    /// A packager phase started.
    PackagerStart {
        /// Phase.
        phase: PackagerPhase,
        /// Distribution name.
        distribution: String,
        /// Packager.
        packager: PackagerKind,
    },
    /// A packager phase finished.
    PackagerEnd {
        /// Phase.
        phase: PackagerPhase,
        /// Distribution name.
        distribution: String,
        /// Packager.
        packager: PackagerKind,
        /// The phase failed.
        failed: bool,
    },
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SessionStart => f.write_str("session-start"),
            Self::SessionEnd { .. } => f.write_str("session-end"),
            Self::StepStart { step } => write!(f, "step-start:{step}"),
            Self::StepEnd { step, .. } => write!(f, "step-end:{step}"),
            Self::DistributionStart { distribution } => write!(f, "distribution-start:{distribution}"),
            Self::DistributionEnd { distribution } => write!(f, "distribution-end:{distribution}"),
            Self::PackagerStart {
                phase,
                distribution,
                packager,
            } => write!(f, "{phase}-start:{distribution}/{packager}"),
            Self::PackagerEnd {
                phase,
                distribution,
                packager,
                ..
            } => write!(f, "{phase}-end:{distribution}/{packager}"),
        }
    }
}

/// Observer of workflow events.
pub trait Listener: fmt::Debug + Send + Sync {
    /// Name used in error reports.
    fn name(&self) -> &str;

    /// Handle one event. An error stops dispatch to later listeners.
    fn on_event(&self, context: &ContextView, event: &Event) -> Result<(), ListenerError>;
}
