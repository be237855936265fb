pub mod breath;
pub mod config;
pub mod journal;
pub mod ritual;
pub mod stopwatch;
