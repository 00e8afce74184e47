//! Generic bracket resolution.
//!
//! Every tiered table in the policy documents (lateness, early leave,
//! efficiency, quality, attendance percentage, task completion, notice
//! deficit, tax, project grade) is resolved through [`resolve_bracket`], so
//! all of them share one tie-break rule: a value below the first lower bound
//! falls into the lowest tier.

use rust_decimal::Decimal;

use crate::config::Tier;
use crate::error::{EngineError, EngineResult};

/// Finds the tier whose `[min, max)` contains `value`.
///
/// Tiers must be ordered, contiguous and cover `[0, ∞)` (see
/// [`validate_tiers`]). A value below the first lower bound resolves to the
/// lowest tier.
///
/// # Errors
///
/// Returns [`EngineError::PolicyNotFound`] naming `table` if the tiers are
/// empty or malformed.
///
/// # Example
///
/// ```
/// use workforce_engine::calculation::resolve_bracket;
/// use workforce_engine::config::Tier;
/// use rust_decimal::Decimal;
///
/// let tiers = vec![
///     Tier { min: Decimal::from(0), max: Some(Decimal::from(15)), effect: 100 },
///     Tier { min: Decimal::from(15), max: Some(Decimal::from(30)), effect: 200 },
///     Tier { min: Decimal::from(30), max: None, effect: 500 },
/// ];
///
/// let tier = resolve_bracket(Decimal::from(20), &tiers, "late_arrival").unwrap();
/// assert_eq!(tier.effect, 200);
///
/// let tier = resolve_bracket(Decimal::from(-5), &tiers, "late_arrival").unwrap();
/// assert_eq!(tier.effect, 100);
/// ```
pub fn resolve_bracket<'a, E>(
    value: Decimal,
    tiers: &'a [Tier<E>],
    table: &str,
) -> EngineResult<&'a Tier<E>> {
    if validate_tiers(tiers, table).is_err() {
        return Err(EngineError::PolicyNotFound {
            table: table.to_string(),
        });
    }

    // Validation guarantees a non-empty, gap-free cover of [0, ∞), so only a
    // value below the first bound can miss.
    Ok(tiers
        .iter()
        .find(|tier| tier.contains(value))
        .unwrap_or(&tiers[0]))
}

/// Checks that tiers are non-empty, start at zero, are contiguous and end
/// unbounded.
///
/// # Errors
///
/// Returns [`EngineError::InvalidPolicy`] describing the first problem found.
pub fn validate_tiers<E>(tiers: &[Tier<E>], table: &str) -> EngineResult<()> {
    let invalid = |message: String| EngineError::InvalidPolicy {
        policy: table.to_string(),
        message,
    };

    let first = tiers
        .first()
        .ok_or_else(|| invalid("table has no tiers".to_string()))?;
    if first.min != Decimal::ZERO {
        return Err(invalid(format!(
            "first tier must start at 0, starts at {}",
            first.min
        )));
    }

    for (index, tier) in tiers.iter().enumerate() {
        let is_last = index + 1 == tiers.len();
        match (tier.max, is_last) {
            (Some(max), _) if max <= tier.min => {
                return Err(invalid(format!(
                    "tier {} has an empty range [{}, {})",
                    index, tier.min, max
                )));
            }
            (Some(max), false) => {
                let next_min = tiers[index + 1].min;
                if next_min != max {
                    return Err(invalid(format!(
                        "tier {} ends at {} but tier {} starts at {}",
                        index,
                        max,
                        index + 1,
                        next_min
                    )));
                }
            }
            (Some(max), true) => {
                return Err(invalid(format!(
                    "last tier must be unbounded, ends at {}",
                    max
                )));
            }
            (None, false) => {
                return Err(invalid(format!(
                    "only the last tier may be unbounded, tier {} is",
                    index
                )));
            }
            (None, true) => {}
        }
    }
    Ok(())
}
