//! Policy configuration for the workforce engine.
//!
//! Policies are four YAML documents (attendance, payroll, leave, reward)
//! loaded into one immutable [`PolicySnapshot`]. The [`PolicyStore`] swaps
//! snapshots atomically when a document is replaced.
//!
//! # Example
//!
//! ```no_run
//! use workforce_engine::config::PolicyStore;
//!
//! let store = PolicyStore::load("./config/policies").unwrap();
//! let snapshot = store.snapshot();
//! println!("Policy version {}", snapshot.version);
//! ```

mod loader;
mod settings;
mod store;
mod types;

pub use loader::PolicyLoader;
pub use settings::{DEFAULT_BIND_ADDR, DEFAULT_POLICY_DIR, ServerSettings};
pub use store::PolicyStore;
pub use types::{
    ApprovalMultipliers, AttendanceEffect, AttendancePolicy, BlackoutPeriod, BonusEffect,
    BonusTables, EarlyArrivalBonus, EarlyLeaveTables, GradeEffect, LeavePolicy, LeaveTypePolicy,
    MultiplierEffect, NoticeRatio, OvertimeMultipliers, PayrollPenaltyRates, PayrollPolicy,
    PolicyDocument, PolicySnapshot, RewardPolicy, RewardType, StatutoryConfig, StreakMilestone,
    TaxEffect, Tier, WorkHours,
};
