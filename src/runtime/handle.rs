//! Single-writer runtime loop and its async handle.
//!
//! One tokio task owns the store; commands arrive over a bounded mpsc
//! channel and reply through oneshots, events fan out over a broadcast
//! channel. Standings are recomputed lazily: mutations only invalidate the
//! cached value, the next standings query pays for the recompute.

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::{
    core::store::{RegattaStore, StoreError},
    op::StoredOp,
    record::{ResultDraft, ResultPatch, ResultRecord},
    score::standings::{ScoringError, ScoringOptions, SeriesStanding},
    series::{Championship, Competitor, Race},
    types::{OpSeq, RaceId, RaceStatus, ResultId},
};

use super::events::RegattaEvent;

/// Errors surfaced through the runtime handle.
#[derive(Debug)]
pub enum RuntimeError {
    /// Store-level failure.
    Store(StoreError),
    /// Scoring-level failure.
    Scoring(ScoringError),
    /// The runtime task is gone.
    ChannelClosed,
}

impl From<StoreError> for RuntimeError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ScoringError> for RuntimeError {
    fn from(value: ScoringError) -> Self {
        Self::Scoring(value)
    }
}

/// Runtime tuning knobs.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Broadcast channel capacity for [`RegattaEvent`]s.
    pub events_capacity: usize,
    /// When true, standings queries reuse the last computed value until a
    /// mutation invalidates it.
    pub cache_standings: bool,
    /// Reference strictness passed through to the scoring engine.
    pub scoring: ScoringOptions,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            events_capacity: 1024,
            cache_standings: true,
            scoring: ScoringOptions::default(),
        }
    }
}

/// Cloneable async handle to one regatta runtime.
pub struct RegattaHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<RegattaEvent>,
}

impl Clone for RegattaHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    AddCompetitor {
        competitor: Competitor,
        resp: oneshot::Sender<()>,
    },
    AddRace {
        race: Race,
        resp: oneshot::Sender<()>,
    },
    SetRaceStatus {
        id: RaceId,
        status: RaceStatus,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    SetChampionship {
        championship: Championship,
        resp: oneshot::Sender<()>,
    },
    Insert {
        draft: ResultDraft,
        resp: oneshot::Sender<Result<ResultId, RuntimeError>>,
    },
    Patch {
        id: ResultId,
        patch: ResultPatch,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Void {
        id: ResultId,
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Undo {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Redo {
        resp: oneshot::Sender<Result<(), RuntimeError>>,
    },
    Get {
        id: ResultId,
        resp: oneshot::Sender<Option<ResultRecord>>,
    },
    Recent {
        n: usize,
        resp: oneshot::Sender<Vec<ResultRecord>>,
    },
    Standings {
        resp: oneshot::Sender<Result<Vec<SeriesStanding>, RuntimeError>>,
    },
    RaceLeaderboard {
        race_id: RaceId,
        resp: oneshot::Sender<Vec<ResultRecord>>,
    },
    CompetitorResults {
        sail_number: String,
        resp: oneshot::Sender<Vec<ResultRecord>>,
    },
    Journal {
        since: OpSeq,
        resp: oneshot::Sender<Vec<StoredOp>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Spawns the single-writer loop and returns its handle.
pub fn spawn_regatta(
    store: RegattaStore,
    championship: Championship,
    config: RuntimeConfig,
) -> RegattaHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(256);
    let (events_tx, _) = broadcast::channel::<RegattaEvent>(config.events_capacity);

    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        let mut store = store;
        let mut championship = championship;
        let mut cached: Option<Vec<SeriesStanding>> = None;

        while let Some(cmd) = cmd_rx.recv().await {
            let done = handle_command(
                cmd,
                &mut store,
                &mut championship,
                &mut cached,
                &events_tx_loop,
                &config,
            );
            if done {
                break;
            }
        }
    });

    RegattaHandle { cmd_tx, events_tx }
}

impl RegattaHandle {
    /// Subscribes to the runtime event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<RegattaEvent> {
        self.events_tx.subscribe()
    }

    /// Registers a competitor.
    pub async fn add_competitor(&self, competitor: Competitor) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::AddCompetitor {
                competitor,
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Registers a race.
    pub async fn add_race(&self, race: Race) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::AddRace { race, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Moves a race between lifecycle states.
    pub async fn set_race_status(
        &self,
        id: RaceId,
        status: RaceStatus,
    ) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::SetRaceStatus {
                id,
                status,
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Replaces the championship configuration (e.g. a revised discard
    /// allowance after abandonments) and invalidates cached standings.
    pub async fn set_championship(&self, championship: Championship) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::SetChampionship {
                championship,
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Enters a new result.
    pub async fn insert(&self, draft: ResultDraft) -> Result<ResultId, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Insert { draft, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Applies a correction to an existing result.
    pub async fn patch(&self, id: ResultId, patch: ResultPatch) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Patch { id, patch, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Toggles the void flag on a result.
    pub async fn void(&self, id: ResultId) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Void { id, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Reverts the most recent mutation.
    pub async fn undo(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Undo { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Re-applies the most recently undone mutation.
    pub async fn redo(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Redo { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Fetches one result by id.
    pub async fn get(&self, id: ResultId) -> Result<Option<ResultRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Get { id, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Fetches the last `n` entered results.
    pub async fn recent(&self, n: usize) -> Result<Vec<ResultRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Recent { n, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Computes (or returns cached) series standings.
    pub async fn standings(&self) -> Result<Vec<SeriesStanding>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Standings { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Fetches the ordered leaderboard of one race.
    pub async fn race_leaderboard(&self, race_id: RaceId) -> Result<Vec<ResultRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::RaceLeaderboard { race_id, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Fetches one competitor's score card in race order.
    pub async fn competitor_results(
        &self,
        sail_number: impl Into<String>,
    ) -> Result<Vec<ResultRecord>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::CompetitorResults {
                sail_number: sail_number.into(),
                resp: tx,
            })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Fetches the audit journal after the given sequence.
    pub async fn journal_since(&self, seq: OpSeq) -> Result<Vec<StoredOp>, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Journal { since: seq, resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }

    /// Stops the runtime loop after in-flight commands drain.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

fn handle_command(
    cmd: Command,
    store: &mut RegattaStore,
    championship: &mut Championship,
    cached: &mut Option<Vec<SeriesStanding>>,
    events_tx: &broadcast::Sender<RegattaEvent>,
    config: &RuntimeConfig,
) -> bool {
    match cmd {
        Command::AddCompetitor { competitor, resp } => {
            store.add_competitor(competitor);
            invalidate(store, cached, events_tx);
            let _ = resp.send(());
        }
        Command::AddRace { race, resp } => {
            store.add_race(race);
            invalidate(store, cached, events_tx);
            let _ = resp.send(());
        }
        Command::SetRaceStatus { id, status, resp } => {
            let res = store.set_race_status(id, status).map_err(RuntimeError::from);
            if res.is_ok() {
                let _ = events_tx.send(RegattaEvent::RaceStatusChanged { id, status });
                invalidate(store, cached, events_tx);
            }
            let _ = resp.send(res.map(|_| ()));
        }
        Command::SetChampionship {
            championship: next,
            resp,
        } => {
            *championship = next;
            invalidate(store, cached, events_tx);
            let _ = resp.send(());
        }
        Command::Insert { draft, resp } => {
            let res = store
                .insert(draft)
                .map_err(RuntimeError::from)
                .map(|(id, _)| {
                    let _ = events_tx.send(RegattaEvent::ResultInserted { id });
                    id
                });
            if res.is_ok() {
                invalidate(store, cached, events_tx);
            }
            let _ = resp.send(res);
        }
        Command::Patch { id, patch, resp } => {
            let res = store.patch(id, patch).map_err(RuntimeError::from).map(|_| {
                let _ = events_tx.send(RegattaEvent::ResultCorrected { id });
            });
            if res.is_ok() {
                invalidate(store, cached, events_tx);
            }
            let _ = resp.send(res);
        }
        Command::Void { id, resp } => {
            let res = store.void(id).map_err(RuntimeError::from).map(|_| {
                let _ = events_tx.send(RegattaEvent::ResultVoided { id });
            });
            if res.is_ok() {
                invalidate(store, cached, events_tx);
            }
            let _ = resp.send(res);
        }
        Command::Undo { resp } => {
            let res = store.undo().map_err(RuntimeError::from).map(|_| {
                let _ = events_tx.send(RegattaEvent::UndoApplied);
            });
            if res.is_ok() {
                invalidate(store, cached, events_tx);
            }
            let _ = resp.send(res);
        }
        Command::Redo { resp } => {
            let res = store.redo().map_err(RuntimeError::from).map(|_| {
                let _ = events_tx.send(RegattaEvent::RedoApplied);
            });
            if res.is_ok() {
                invalidate(store, cached, events_tx);
            }
            let _ = resp.send(res);
        }
        Command::Get { id, resp } => {
            let _ = resp.send(store.get_cloned(id));
        }
        Command::Recent { n, resp } => {
            let _ = resp.send(store.recent_cloned(n));
        }
        Command::Standings { resp } => {
            let out = if config.cache_standings {
                if let Some(standings) = cached.as_ref() {
                    Ok(standings.clone())
                } else {
                    let res = store
                        .standings(championship, &config.scoring)
                        .map_err(RuntimeError::from);
                    if let Ok(standings) = &res {
                        *cached = Some(standings.clone());
                    }
                    res
                }
            } else {
                store
                    .standings(championship, &config.scoring)
                    .map_err(RuntimeError::from)
            };
            let _ = resp.send(out);
        }
        Command::RaceLeaderboard { race_id, resp } => {
            let _ = resp.send(store.race_leaderboard(race_id));
        }
        Command::CompetitorResults { sail_number, resp } => {
            let _ = resp.send(store.competitor_results(&sail_number));
        }
        Command::Journal { since, resp } => {
            let _ = resp.send(store.journal_since(since).to_vec());
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}

fn invalidate(
    store: &RegattaStore,
    cached: &mut Option<Vec<SeriesStanding>>,
    events_tx: &broadcast::Sender<RegattaEvent>,
) {
    *cached = None;
    let _ = events_tx.send(RegattaEvent::StandingsInvalidated {
        op_seq: store.latest_op_seq(),
    });
}
