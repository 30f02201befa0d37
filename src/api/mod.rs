pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod test_server;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use types::{
    Activity, AverageComparison, Challenge, ChartData, Dashboard, HistoryEntry, MyRank, Ranking,
    RankingEntry, Score, ScoreRank, User,
};
