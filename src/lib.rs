//! # reactji
//!
//! Counts the emoji reactions every member of a Slack workspace has ever
//! placed, and how often they were the first to react.
//!
//! Per user, [`collect::Collector`] pages through `reactions.list`, riding
//! out rate limits and flaky responses, drops items repeated across pages,
//! and folds the rest into a [`tally::ReactionTally`]. [`job`] runs that
//! for the whole workspace with a resumable [`cache`], and [`report`]
//! merges the cache into one CSV.

pub mod cache;
pub mod collect;
pub mod config;
pub mod error;
pub mod job;
pub mod model;
pub mod report;
pub mod slack;
pub mod tally;
pub mod telemetry;
