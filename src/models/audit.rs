//! Audit trail types shared by the evaluators.

use serde::{Deserialize, Serialize};

/// A single step in an audit trail recording a policy decision.
///
/// Each step captures the input, output, and reasoning for one bracket
/// resolution or derived value.
///
/// # Example
///
/// ```
/// use workforce_engine::models::AuditStep;
///
/// let step = AuditStep {
///     step_number: 1,
///     rule_id: "efficiency_multiplier".to_string(),
///     rule_name: "Efficiency Multiplier".to_string(),
///     policy_ref: "reward.efficiency_multipliers".to_string(),
///     input: serde_json::json!({"efficiency": "133"}),
///     output: serde_json::json!({"multiplier": "1.5"}),
///     reasoning: "Efficiency 133% falls in the 'excellent' tier".to_string(),
/// };
/// assert_eq!(step.step_number, 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Dotted path of the policy table the rule read from.
    pub policy_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A non-fatal finding attached to a validation result.
///
/// Leave validation reports both errors and warnings with this shape so callers
/// can show partial feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// A code identifying the type of issue (e.g. `insufficient_balance`).
    pub code: String,
    /// A human-readable description of the issue.
    pub message: String,
}

impl ValidationIssue {
    /// Creates a new validation issue.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
