//! Authoritative in-memory regatta results with low-point series scoring.
//!
//! # Examples
//!
//! In-memory usage with [`core::store::RegattaStore`]:
//! ```
//! use fleetscore::{
//!     core::store::RegattaStore,
//!     record::{ResultDraft, ResultFlags},
//!     score::standings::ScoringOptions,
//!     series::{Championship, Competitor, Race},
//!     types::{RaceStatus, ResultStatus},
//! };
//!
//! let mut store = RegattaStore::new();
//! store.add_competitor(Competitor {
//!     sail_number: "GBR8".to_string(),
//!     country_code: "GBR".to_string(),
//!     is_verified: true,
//! });
//! store.add_race(Race {
//!     id: 1,
//!     number: 1,
//!     status: RaceStatus::Scheduled,
//!     is_discardable: true,
//! });
//! store.set_race_status(1, RaceStatus::Racing).expect("start");
//! let (id, _op) = store.insert(ResultDraft {
//!     race_id: 1,
//!     sail_number: "GBR8".to_string(),
//!     position: Some(1),
//!     points: 1.0,
//!     status: ResultStatus::Finished,
//!     flags: ResultFlags::default(),
//! }).expect("insert");
//! assert_eq!(id, 1);
//! store.set_race_status(1, RaceStatus::Finished).expect("finish");
//!
//! let championship = Championship::low_point(1, 0);
//! let standings = store
//!     .standings(&championship, &ScoringOptions::default())
//!     .expect("standings");
//! assert_eq!(standings[0].sail_number, "GBR8");
//! assert_eq!(standings[0].net_points, 1.0);
//! ```
//!
//! Runtime usage with the async handle:
//! ```
//! use fleetscore::{
//!     core::store::RegattaStore,
//!     record::{ResultDraft, ResultFlags},
//!     runtime::handle::{spawn_regatta, RuntimeConfig},
//!     series::{Championship, Competitor, Race},
//!     types::{RaceStatus, ResultStatus},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let handle = spawn_regatta(
//!     RegattaStore::new(),
//!     Championship::low_point(1, 0),
//!     RuntimeConfig::default(),
//! );
//! handle.add_competitor(Competitor {
//!     sail_number: "HKG59".to_string(),
//!     country_code: "HKG".to_string(),
//!     is_verified: true,
//! }).await.expect("register");
//! handle.add_race(Race {
//!     id: 1,
//!     number: 1,
//!     status: RaceStatus::Scheduled,
//!     is_discardable: true,
//! }).await.expect("race");
//! handle.set_race_status(1, RaceStatus::Racing).await.expect("start");
//! let _id = handle.insert(ResultDraft {
//!     race_id: 1,
//!     sail_number: "HKG59".to_string(),
//!     position: Some(1),
//!     points: 1.0,
//!     status: ResultStatus::Finished,
//!     flags: ResultFlags::default(),
//! }).await.expect("insert");
//! handle.set_race_status(1, RaceStatus::Finished).await.expect("finish");
//! let standings = handle.standings().await.expect("standings");
//! assert_eq!(standings.len(), 1);
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Core in-memory store and index helpers.
pub mod core;
/// Mutation op model and journal types.
pub mod op;
/// Result domain records and patches.
pub mod record;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Pure standings, leaderboard, and score-card computation.
pub mod score;
/// Championship, competitor, and race types.
pub mod series;
/// Shared primitive types and enums.
pub mod types;
