//! Policy loading functionality.
//!
//! This module provides the [`PolicyLoader`] type for loading the four policy
//! documents from YAML files into a validated [`PolicySnapshot`].

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::{AttendancePolicy, LeavePolicy, PayrollPolicy, PolicySnapshot, RewardPolicy};

/// Loads and validates the policy documents of a directory.
///
/// # Directory Structure
///
/// ```text
/// config/policies/
/// ├── attendance.yaml  # Work hours, lateness and early-leave tiers, streaks
/// ├── payroll.yaml     # Salary structure, bonus tables, penalties, tax
/// ├── leave.yaml       # Leave types, notice ratios, blackout windows
/// └── reward.yaml      # TAT multipliers, reward types, project grades
/// ```
///
/// # Example
///
/// ```no_run
/// use workforce_engine::config::PolicyLoader;
///
/// let loader = PolicyLoader::load("./config/policies").unwrap();
/// let snapshot = loader.snapshot();
/// println!("Attendance policy {}", snapshot.attendance.version);
/// ```
#[derive(Debug, Clone)]
pub struct PolicyLoader {
    snapshot: PolicySnapshot,
}

impl PolicyLoader {
    /// Loads every policy document from `path` and validates the result.
    ///
    /// The loaded snapshot has version 1.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ConfigNotFound`] if a document is missing
    /// - [`EngineError::ConfigParseError`] if a document is not valid YAML for its type
    /// - [`EngineError::InvalidPolicy`] if a table is structurally invalid
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let snapshot = PolicySnapshot {
            version: 1,
            attendance: Self::load_yaml::<AttendancePolicy>(&path.join("attendance.yaml"))?,
            payroll: Self::load_yaml::<PayrollPolicy>(&path.join("payroll.yaml"))?,
            leave: Self::load_yaml::<LeavePolicy>(&path.join("leave.yaml"))?,
            reward: Self::load_yaml::<RewardPolicy>(&path.join("reward.yaml"))?,
        };
        snapshot.validate()?;

        info!(path = %path.display(), "Loaded policy documents");

        Ok(Self { snapshot })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded snapshot.
    pub fn snapshot(&self) -> &PolicySnapshot {
        &self.snapshot
    }

    /// Consumes the loader, returning the snapshot.
    pub fn into_snapshot(self) -> PolicySnapshot {
        self.snapshot
    }
}
