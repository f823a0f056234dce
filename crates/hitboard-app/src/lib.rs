// Leaderboard service, per-row fan-out and report rendering behind the
// `hitboard` binary.

pub mod pipeline;
pub mod report;
pub mod service;
