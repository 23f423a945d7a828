//! Authoritative in-memory regatta store.
//!
//! One live result per (race, sail number) pair, sparse corrections with
//! exact undo/redo, and a sequence-ordered journal of every scoring mutation
//! for jury audit. Registry upserts (competitors, races) are not journaled;
//! registration is an external workflow.

use std::time::{SystemTime, UNIX_EPOCH};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{
    core::indices::VecIndex,
    op::{Op, StoredOp},
    record::{ResultDraft, ResultPatch, ResultRecord},
    score::{
        leaderboard::{competitor_results, race_leaderboard},
        standings::{ScoringError, ScoringOptions, SeriesStanding, calculate_standings},
    },
    series::{Championship, Competitor, Race},
    types::{OpSeq, RaceId, RaceStatus, ResultId},
};

/// Errors surfaced by store mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No result with this id.
    MissingResult(ResultId),
    /// No race with this id.
    MissingRace(RaceId),
    /// No registered competitor with this sail number.
    UnknownCompetitor(String),
    /// A live result already exists for this (race, sail number) pair.
    DuplicateResult {
        /// Race of the conflicting pair.
        race_id: RaceId,
        /// Sail number of the conflicting pair.
        sail_number: String,
    },
    /// A result with this id already exists.
    AlreadyExists(ResultId),
    /// The requested race lifecycle transition is not allowed.
    InvalidRaceTransition {
        /// Current race status.
        from: RaceStatus,
        /// Requested race status.
        to: RaceStatus,
    },
    /// Undo stack is empty.
    NothingToUndo,
    /// Redo stack is empty.
    NothingToRedo,
}

/// Serializable point-in-time copy of the store.
///
/// The caller decides how (and whether) to persist it; the store itself never
/// touches storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshotV1 {
    /// Next result id to allocate.
    pub next_result_id: ResultId,
    /// Next op sequence to allocate.
    pub next_op_seq: OpSeq,
    /// Result ids in insertion order.
    pub order: Vec<ResultId>,
    /// Result records in insertion order.
    pub records: Vec<ResultRecord>,
    /// Registered competitors.
    pub competitors: Vec<Competitor>,
    /// Races of the series.
    pub races: Vec<Race>,
}

/// Authoritative in-memory store for one championship's results.
#[derive(Debug, Default)]
pub struct RegattaStore {
    records: HashMap<ResultId, ResultRecord>,
    order: Vec<ResultId>,
    by_sail: VecIndex<String>,
    by_race: VecIndex<RaceId>,
    competitors: HashMap<String, Competitor>,
    races: HashMap<RaceId, Race>,
    undo: Vec<Op>,
    redo: Vec<Op>,
    journal: Vec<StoredOp>,
    next_op_seq: OpSeq,
    next_result_id: ResultId,
}

impl RegattaStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            next_op_seq: 1,
            next_result_id: 1,
            ..Self::default()
        }
    }

    /// Rebuilds a store from an exported snapshot. The journal and undo/redo
    /// stacks start empty.
    pub fn from_snapshot(snapshot: StoreSnapshotV1) -> Self {
        let mut store = Self {
            next_result_id: snapshot.next_result_id,
            next_op_seq: snapshot.next_op_seq,
            order: snapshot.order,
            ..Self::default()
        };

        for competitor in snapshot.competitors {
            store
                .competitors
                .insert(competitor.sail_number.clone(), competitor);
        }

        for race in snapshot.races {
            store.races.insert(race.id, race);
        }

        for rec in snapshot.records {
            store.insert_indices(&rec);
            store.records.insert(rec.id, rec);
        }

        store
    }

    /// Exports a serializable copy of current state.
    pub fn export_snapshot(&self) -> StoreSnapshotV1 {
        let records = self
            .order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect();

        let mut competitors: Vec<Competitor> = self.competitors.values().cloned().collect();
        competitors.sort_by(|a, b| a.sail_number.cmp(&b.sail_number));

        let mut races: Vec<Race> = self.races.values().cloned().collect();
        races.sort_by_key(|r| (r.number, r.id));

        StoreSnapshotV1 {
            next_result_id: self.next_result_id,
            next_op_seq: self.next_op_seq,
            order: self.order.clone(),
            records,
            competitors,
            races,
        }
    }

    /// Registers or replaces a competitor, keyed by sail number.
    pub fn add_competitor(&mut self, competitor: Competitor) {
        self.competitors
            .insert(competitor.sail_number.clone(), competitor);
    }

    /// Registers or replaces a race, keyed by race id.
    pub fn add_race(&mut self, race: Race) {
        self.races.insert(race.id, race);
    }

    /// Moves a race between lifecycle states, journaling the transition.
    pub fn set_race_status(
        &mut self,
        id: RaceId,
        to: RaceStatus,
    ) -> Result<StoredOp, StoreError> {
        let from = self.races.get(&id).ok_or(StoreError::MissingRace(id))?.status;
        if !Race::transition_allowed(from, to) {
            return Err(StoreError::InvalidRaceTransition { from, to });
        }

        let (stored, inverse) = self.apply_race_status(id, from, to)?;
        self.undo.push(inverse);
        self.redo.clear();
        Ok(stored)
    }

    /// Inserts a new result, allocating its id.
    ///
    /// The race and competitor must be registered, and no live result may
    /// already exist for the (race, sail number) pair.
    pub fn insert(&mut self, draft: ResultDraft) -> Result<(ResultId, StoredOp), StoreError> {
        if !self.races.contains_key(&draft.race_id) {
            return Err(StoreError::MissingRace(draft.race_id));
        }
        if !self.competitors.contains_key(&draft.sail_number) {
            return Err(StoreError::UnknownCompetitor(draft.sail_number));
        }
        if !draft.flags.is_void && self.live_pair_exists(draft.race_id, &draft.sail_number, None) {
            return Err(StoreError::DuplicateResult {
                race_id: draft.race_id,
                sail_number: draft.sail_number,
            });
        }

        let id = self.next_result_id;
        self.next_result_id += 1;

        let result = ResultRecord {
            id,
            race_id: draft.race_id,
            sail_number: draft.sail_number,
            position: draft.position,
            points: draft.points,
            status: draft.status,
            flags: draft.flags,
        };

        let (stored, inverse) = self.apply_insert(result)?;
        self.undo.push(inverse);
        self.redo.clear();
        Ok((id, stored))
    }

    /// Applies a correction to an existing result.
    pub fn patch(&mut self, id: ResultId, patch: ResultPatch) -> Result<StoredOp, StoreError> {
        let rec = self.records.get(&id).ok_or(StoreError::MissingResult(id))?;

        let new_race = patch.race_id.unwrap_or(rec.race_id);
        let new_sail = patch.sail_number.as_deref().unwrap_or(&rec.sail_number);
        let stays_live = !patch.is_void.unwrap_or(rec.flags.is_void);

        if !self.races.contains_key(&new_race) {
            return Err(StoreError::MissingRace(new_race));
        }
        if !self.competitors.contains_key(new_sail) {
            return Err(StoreError::UnknownCompetitor(new_sail.to_string()));
        }
        if stays_live && self.live_pair_exists(new_race, new_sail, Some(id)) {
            return Err(StoreError::DuplicateResult {
                race_id: new_race,
                sail_number: new_sail.to_string(),
            });
        }

        let (stored, inverse) = self.apply_patch(id, patch)?;
        self.undo.push(inverse);
        self.redo.clear();
        Ok(stored)
    }

    /// Toggles the void flag on a result, striking or restoring it.
    ///
    /// Restoring does not re-check (race, sail) uniqueness; the pair may
    /// have been refilled while the result was void.
    pub fn void(&mut self, id: ResultId) -> Result<StoredOp, StoreError> {
        let prev_is_void = self
            .records
            .get(&id)
            .ok_or(StoreError::MissingResult(id))?
            .flags
            .is_void;
        let (stored, inverse) = self.apply_void(id, prev_is_void)?;
        self.undo.push(inverse);
        self.redo.clear();
        Ok(stored)
    }

    /// Reverts the most recent mutation.
    pub fn undo(&mut self) -> Result<StoredOp, StoreError> {
        let op = self.undo.pop().ok_or(StoreError::NothingToUndo)?;
        let (stored, inverse) = self.apply_op(op)?;
        self.redo.push(inverse);
        Ok(stored)
    }

    /// Re-applies the most recently undone mutation.
    pub fn redo(&mut self) -> Result<StoredOp, StoreError> {
        let op = self.redo.pop().ok_or(StoreError::NothingToRedo)?;
        let (stored, inverse) = self.apply_op(op)?;
        self.undo.push(inverse);
        Ok(stored)
    }

    /// Returns the result with this id, if present.
    pub fn get(&self, id: ResultId) -> Option<&ResultRecord> {
        self.records.get(&id)
    }

    /// Cloned variant of [`RegattaStore::get`].
    pub fn get_cloned(&self, id: ResultId) -> Option<ResultRecord> {
        self.get(id).cloned()
    }

    /// Returns the registered competitor with this sail number, if present.
    pub fn competitor(&self, sail_number: &str) -> Option<&Competitor> {
        self.competitors.get(sail_number)
    }

    /// Returns the race with this id, if present.
    pub fn race(&self, id: RaceId) -> Option<&Race> {
        self.races.get(&id)
    }

    /// Last `n` results in entry order.
    pub fn recent(&self, n: usize) -> Vec<&ResultRecord> {
        let len = self.order.len();
        let start = len.saturating_sub(n);
        self.order[start..]
            .iter()
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Cloned variant of [`RegattaStore::recent`].
    pub fn recent_cloned(&self, n: usize) -> Vec<ResultRecord> {
        self.recent(n).into_iter().cloned().collect()
    }

    /// All results entered for this sail number, in entry order.
    pub fn by_sail(&self, sail_number: &str) -> Vec<&ResultRecord> {
        self.by_sail
            .get(sail_number)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Cloned variant of [`RegattaStore::by_sail`].
    pub fn by_sail_cloned(&self, sail_number: &str) -> Vec<ResultRecord> {
        self.by_sail(sail_number).into_iter().cloned().collect()
    }

    /// All results entered for this race, in entry order.
    pub fn by_race(&self, race_id: RaceId) -> Vec<&ResultRecord> {
        self.by_race
            .get(&race_id)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    /// Cloned variant of [`RegattaStore::by_race`].
    pub fn by_race_cloned(&self, race_id: RaceId) -> Vec<ResultRecord> {
        self.by_race(race_id).into_iter().cloned().collect()
    }

    /// Result ids in entry order.
    pub fn ordered_ids(&self) -> &[ResultId] {
        &self.order
    }

    /// Full mutation journal since the store was opened, in sequence order.
    pub fn journal(&self) -> &[StoredOp] {
        &self.journal
    }

    /// Journal entries with sequence strictly greater than `seq`.
    pub fn journal_since(&self, seq: OpSeq) -> &[StoredOp] {
        let start = self.journal.partition_point(|op| op.seq <= seq);
        &self.journal[start..]
    }

    /// Number of pending undo steps.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of pending redo steps.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Highest op sequence applied so far.
    pub fn latest_op_seq(&self) -> OpSeq {
        self.next_op_seq.saturating_sub(1)
    }

    /// Computes series standings over the store's current contents.
    ///
    /// Snapshots the inputs and delegates to
    /// [`calculate_standings`](crate::score::standings::calculate_standings);
    /// the engine stays pure and never borrows store internals across calls.
    pub fn standings(
        &self,
        championship: &Championship,
        options: &ScoringOptions,
    ) -> Result<Vec<SeriesStanding>, ScoringError> {
        let mut competitors: Vec<Competitor> = self.competitors.values().cloned().collect();
        competitors.sort_by(|a, b| a.sail_number.cmp(&b.sail_number));

        let mut races: Vec<Race> = self.races.values().cloned().collect();
        races.sort_by_key(|r| (r.number, r.id));

        let results: Vec<ResultRecord> = self
            .order
            .iter()
            .filter_map(|id| self.records.get(id).cloned())
            .collect();

        calculate_standings(championship, &competitors, &races, &results, options)
    }

    /// Leaderboard for one race over the store's current contents.
    pub fn race_leaderboard(&self, race_id: RaceId) -> Vec<ResultRecord> {
        race_leaderboard(race_id, &self.by_race_cloned(race_id))
    }

    /// One competitor's score card over the store's current contents.
    pub fn competitor_results(&self, sail_number: &str) -> Vec<ResultRecord> {
        let mut races: Vec<Race> = self.races.values().cloned().collect();
        races.sort_by_key(|r| (r.number, r.id));
        competitor_results(sail_number, &races, &self.by_sail_cloned(sail_number))
    }

    fn live_pair_exists(&self, race_id: RaceId, sail_number: &str, excluding: Option<ResultId>) -> bool {
        self.by_race
            .get(&race_id)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter(|id| Some(**id) != excluding)
            .filter_map(|id| self.records.get(id))
            .any(|rec| !rec.flags.is_void && rec.sail_number == sail_number)
    }

    fn apply_op(&mut self, op: Op) -> Result<(StoredOp, Op), StoreError> {
        match op {
            Op::Insert { result } => self.apply_insert(result),
            Op::Patch { id, patch, .. } => self.apply_patch(id, patch),
            Op::Void { id, prev_is_void } => self.apply_void(id, prev_is_void),
            Op::RaceStatus { id, prev, next } => self.apply_race_status(id, prev, next),
        }
    }

    fn apply_insert(&mut self, result: ResultRecord) -> Result<(StoredOp, Op), StoreError> {
        if self.records.contains_key(&result.id) {
            return Err(StoreError::AlreadyExists(result.id));
        }

        let id = result.id;
        self.next_result_id = self.next_result_id.max(id.saturating_add(1));
        self.insert_indices(&result);
        self.order.push(id);
        self.records.insert(id, result.clone());

        let stored = self.journaled(Op::Insert { result });
        let inverse = Op::Void {
            id,
            prev_is_void: false,
        };
        Ok((stored, inverse))
    }

    fn apply_patch(&mut self, id: ResultId, patch: ResultPatch) -> Result<(StoredOp, Op), StoreError> {
        let rec = self.records.get_mut(&id).ok_or(StoreError::MissingResult(id))?;
        let old_sail = rec.sail_number.clone();
        let old_race = rec.race_id;

        let prev = patch.capture_inverse_for(rec);
        patch.apply_to(rec);

        if rec.sail_number != old_sail {
            Self::remove_from_vec_index(self.by_sail.entry(old_sail).or_default(), id);
            self.by_sail
                .entry(rec.sail_number.clone())
                .or_default()
                .push(id);
        }

        if rec.race_id != old_race {
            Self::remove_from_vec_index(self.by_race.entry(old_race).or_default(), id);
            self.by_race.entry(rec.race_id).or_default().push(id);
        }

        let stored = self.journaled(Op::Patch {
            id,
            patch: patch.clone(),
            prev: prev.clone(),
        });
        let inverse = Op::Patch {
            id,
            patch: prev,
            prev: patch,
        };
        Ok((stored, inverse))
    }

    fn apply_void(&mut self, id: ResultId, prev_is_void: bool) -> Result<(StoredOp, Op), StoreError> {
        let new_is_void = {
            let rec = self.records.get_mut(&id).ok_or(StoreError::MissingResult(id))?;
            rec.flags.is_void = !prev_is_void;
            rec.flags.is_void
        };

        let stored = self.journaled(Op::Void { id, prev_is_void });
        let inverse = Op::Void {
            id,
            prev_is_void: new_is_void,
        };
        Ok((stored, inverse))
    }

    fn apply_race_status(
        &mut self,
        id: RaceId,
        prev: RaceStatus,
        next: RaceStatus,
    ) -> Result<(StoredOp, Op), StoreError> {
        let race = self.races.get_mut(&id).ok_or(StoreError::MissingRace(id))?;
        race.status = next;

        let stored = self.journaled(Op::RaceStatus { id, prev, next });
        let inverse = Op::RaceStatus {
            id,
            prev: next,
            next: prev,
        };
        Ok((stored, inverse))
    }

    fn insert_indices(&mut self, rec: &ResultRecord) {
        self.by_sail
            .entry(rec.sail_number.clone())
            .or_default()
            .push(rec.id);
        self.by_race.entry(rec.race_id).or_default().push(rec.id);
    }

    fn remove_from_vec_index(v: &mut Vec<ResultId>, id: ResultId) {
        if let Some(pos) = v.iter().position(|x| *x == id) {
            v.remove(pos);
        }
    }

    fn journaled(&mut self, op: Op) -> StoredOp {
        let seq = self.next_op_seq;
        self.next_op_seq += 1;
        let stored = StoredOp {
            seq,
            ts_ms: now_ms(),
            op,
        };
        self.journal.push(stored.clone());
        stored
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
