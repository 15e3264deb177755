use serde::{Deserialize, Serialize};

/// Minimum total for a critical success.
pub const CRITICAL_THRESHOLD: i32 = 20;
/// A critical must also beat the target number by this much.
pub const CRITICAL_MARGIN: i32 = 5;

/// Classification of a d20 roll against a target number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    /// No target number was supplied
    None,
    Failure,
    Success,
    Critical,
}

impl Outcome {
    /// Classify a total.
    ///
    /// Critical requires both `total >= 20` and `total >= target + 5`, so it
    /// always implies a successful total.
    pub fn classify(total: i32, target_number: Option<i32>) -> Self {
        let Some(target) = target_number else {
            return Outcome::None;
        };
        if total < target {
            Outcome::Failure
        } else if total >= CRITICAL_THRESHOLD && total >= target + CRITICAL_MARGIN {
            Outcome::Critical
        } else {
            Outcome::Success
        }
    }

    /// Success or critical.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success | Outcome::Critical)
    }

    pub fn label_key(&self) -> Option<&'static str> {
        match self {
            Outcome::None => None,
            Outcome::Failure => Some("WW.Roll.Failure"),
            Outcome::Success => Some("WW.Roll.Success"),
            Outcome::Critical => Some("WW.Roll.Critical"),
        }
    }

    /// CSS class used by the chat card.
    pub fn css_class(&self) -> &'static str {
        match self {
            Outcome::None => "",
            Outcome::Failure => "failure",
            Outcome::Success => "success",
            Outcome::Critical => "critical",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_target_number_is_none() {
        assert_eq!(Outcome::classify(25, None), Outcome::None);
    }

    #[test]
    fn scenario_success_and_critical() {
        assert_eq!(Outcome::classify(14, Some(10)), Outcome::Success);
        assert_eq!(Outcome::classify(21, Some(10)), Outcome::Critical);
    }

    #[test]
    fn critical_requires_both_thresholds() {
        // 20 or more but not beating the target by 5
        assert_eq!(Outcome::classify(20, Some(16)), Outcome::Success);
        // Beats by 5 but under 20
        assert_eq!(Outcome::classify(19, Some(10)), Outcome::Success);
        assert_eq!(Outcome::classify(20, Some(15)), Outcome::Critical);
    }

    #[test]
    fn failure_below_target() {
        assert_eq!(Outcome::classify(9, Some(10)), Outcome::Failure);
        assert_eq!(Outcome::classify(10, Some(10)), Outcome::Success);
        // Never critical when failing, even at 20+
        assert_eq!(Outcome::classify(24, Some(25)), Outcome::Failure);
    }

    #[test]
    fn classification_matches_definition_over_a_grid() {
        for target in -5..35 {
            for total in -10..45 {
                let outcome = Outcome::classify(total, Some(target));
                let critical = total >= 20 && total >= target + 5;
                assert_eq!(outcome == Outcome::Critical, critical);
                assert_eq!(outcome == Outcome::Success, total >= target && !critical);
                assert_eq!(outcome == Outcome::Failure, total < target);
                if critical {
                    assert!(total >= target);
                }
            }
        }
    }
}
