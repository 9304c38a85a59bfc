//! Cadence - durable per-brand job queue, liveness scheduler and worker.
//!
//! Every brand keeps exactly one recurring content cycle outstanding.
//! Approved posts are published once their time comes, and failed work is
//! retried a bounded number of times before it is parked for an operator.
//! The SQLite-backed queue is the only state shared between the scheduler
//! and the workers.

#![allow(missing_docs)]

pub mod agent;
pub mod api;
pub mod app;
pub mod app_info;
pub mod boot;
pub mod cli;
pub mod commands;
pub mod config;
pub mod content;
pub mod database;
pub mod environment;
pub mod jobs;
pub mod router;
pub mod setup_tracing;

#[cfg(any(test, feature = "test-utils"))]
pub mod tests;
