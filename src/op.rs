//! Mutation operation model and journal wrappers.

use serde::{Deserialize, Serialize};

use crate::{
    record::{ResultPatch, ResultRecord},
    types::{OpSeq, RaceId, RaceStatus, ResultId},
};

/// Immutable operation appended to the journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// Insert a fully materialized result.
    Insert {
        /// Inserted record.
        result: ResultRecord,
    },
    /// Correct a result, including precomputed inverse patch.
    Patch {
        /// Result id to mutate.
        id: ResultId,
        /// Forward patch.
        patch: ResultPatch,
        /// Inverse patch that restores prior state.
        prev: ResultPatch,
    },
    /// Toggle void state using previous value.
    Void {
        /// Result id to mutate.
        id: ResultId,
        /// Previous void value.
        prev_is_void: bool,
    },
    /// Move a race between lifecycle states.
    RaceStatus {
        /// Race id to mutate.
        id: RaceId,
        /// State before the transition.
        prev: RaceStatus,
        /// State after the transition.
        next: RaceStatus,
    },
}

/// Journal row metadata plus operation payload.
///
/// The journal doubles as the jury audit trail: every scoring mutation since
/// the store was opened is retained in sequence order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredOp {
    /// Monotonic operation sequence.
    pub seq: OpSeq,
    /// Operation timestamp in milliseconds.
    pub ts_ms: u64,
    /// Operation body.
    pub op: Op,
}
