//! Pure standings computation.

/// Per-race leaderboard and score-card queries.
pub mod leaderboard;
/// Series standings engine: discards, net points, tie-breaking.
pub mod standings;
