// Library root for the prediction-accuracy pipeline: season clock, roster
// loading, upstream lookups, accuracy and ranking.

pub mod accuracy;
pub mod config;
pub mod fetcher;
pub mod leaderboard;
pub mod resolver;
pub mod roster;
pub mod season;
pub mod stats;
