// MLB Stats API implementation of the hitboard `StatsSource`.

pub mod client;
mod response;

pub use client::MlbStatsClient;
