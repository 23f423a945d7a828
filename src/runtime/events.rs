//! Runtime event stream payloads.

use crate::types::{OpSeq, RaceId, RaceStatus, ResultId};

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegattaEvent {
    /// A new result was entered.
    ResultInserted {
        /// Inserted result id.
        id: ResultId,
    },
    /// An existing result was corrected.
    ResultCorrected {
        /// Corrected result id.
        id: ResultId,
    },
    /// A result's void flag was toggled.
    ResultVoided {
        /// Toggled result id.
        id: ResultId,
    },
    /// A race moved between lifecycle states.
    RaceStatusChanged {
        /// Race id.
        id: RaceId,
        /// New status.
        status: RaceStatus,
    },
    /// One undo step was applied.
    UndoApplied,
    /// One redo step was applied.
    RedoApplied,
    /// Cached standings are stale as of this op sequence.
    StandingsInvalidated {
        /// Sequence of the invalidating mutation.
        op_seq: OpSeq,
    },
}
