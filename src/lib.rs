//! Policy-driven workforce engine.
//!
//! This crate derives attendance effects, streaks, task rewards, leave pay
//! impact, payroll records and project summaries from raw events and a set of
//! YAML policy documents. The evaluators in [`calculation`] are pure; the
//! [`service`] layer adds storage and locking, and [`api`] serves it over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod service;

#[cfg(test)]
mod test_support;
