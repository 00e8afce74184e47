//! Shared helpers for unit tests.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::config::{PolicyLoader, PolicySnapshot};

pub(crate) const POLICY_DIR: &str = "./config/policies";

pub(crate) fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub(crate) fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub(crate) fn datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

/// The shipped default policy documents.
pub(crate) fn policies() -> PolicySnapshot {
    PolicyLoader::load(POLICY_DIR)
        .expect("Failed to load default policies")
        .into_snapshot()
}
