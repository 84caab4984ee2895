//! Conditional outcome evaluation
//!
//! Outcomes are walked in authored order and the first matching branch wins.
//! Within one outcome the branches are tried fail, warn, pass. Nothing is
//! reordered across outcomes.

use triage_core::spec::{Outcome, SingleOutcome};

use crate::condition::{ConditionError, evaluate};
use crate::facts::FactTable;
use crate::result::Status;

/// The branch selected by [`evaluate_outcomes`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: Status,
    pub message: String,
    pub uri: String,
    /// False when no authored branch matched and the default was used
    pub matched: bool,
}

impl Verdict {
    fn from_branch(status: Status, branch: &SingleOutcome) -> Self {
        Self {
            status,
            message: branch.message.clone(),
            uri: branch.uri.clone(),
            matched: true,
        }
    }

    fn default_pass(facts: &FactTable) -> Self {
        Self {
            status: Status::Pass,
            message: facts.summary(),
            uri: String::new(),
            matched: false,
        }
    }
}

/// Pick the verdict for `facts`.
///
/// Any condition error aborts the evaluation; it is never turned into a
/// default verdict.
pub fn evaluate_outcomes(outcomes: &[Outcome], facts: &FactTable) -> Result<Verdict, ConditionError> {
    for outcome in outcomes {
        let branches = [
            (Status::Fail, &outcome.fail),
            (Status::Warn, &outcome.warn),
            (Status::Pass, &outcome.pass),
        ];

        for (status, branch) in branches {
            let Some(branch) = branch else { continue };
            if evaluate(&branch.when, facts)? {
                return Ok(Verdict::from_branch(status, branch));
            }
        }
    }

    Ok(Verdict::default_pass(facts))
}

/// First authored fail branch, used when there is nothing to evaluate
pub fn first_fail(outcomes: &[Outcome]) -> Option<&SingleOutcome> {
    outcomes.iter().find_map(|o| o.fail.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn branch(when: &str, message: &str) -> Option<SingleOutcome> {
        Some(SingleOutcome {
            when: when.to_string(),
            message: message.to_string(),
            uri: format!("https://example.com/{}", message),
        })
    }

    fn fail(when: &str, message: &str) -> Outcome {
        Outcome {
            fail: branch(when, message),
            ..Default::default()
        }
    }

    fn warn(when: &str, message: &str) -> Outcome {
        Outcome {
            warn: branch(when, message),
            ..Default::default()
        }
    }

    fn pass(when: &str, message: &str) -> Outcome {
        Outcome {
            pass: branch(when, message),
            ..Default::default()
        }
    }

    fn facts(signed: i64, unsigned: i64, errors: i64) -> FactTable {
        FactTable::new()
            .with("signed", signed)
            .with("unsigned", unsigned)
            .with("errors", errors)
    }

    #[test]
    fn test_fail_then_pass() {
        let outcomes = vec![fail("errors > 0", "broken"), pass("signed > 0", "good")];
        let verdict = evaluate_outcomes(&outcomes, &facts(3, 1, 0)).unwrap();

        assert_eq!(verdict.status, Status::Pass);
        assert_eq!(verdict.message, "good");
        assert_eq!(verdict.uri, "https://example.com/good");
        assert!(verdict.matched);
    }

    #[test]
    fn test_first_match_wins_in_authored_order() {
        // pass listed first matches before the fail that would also match
        let outcomes = vec![pass("", "always"), fail("errors > 0", "broken")];
        let verdict = evaluate_outcomes(&outcomes, &facts(0, 0, 5)).unwrap();
        assert_eq!(verdict.status, Status::Pass);
        assert_eq!(verdict.message, "always");
    }

    #[test]
    fn test_warn_branch() {
        let outcomes = vec![
            fail("errors > 0", "broken"),
            warn("unsigned >= 1", "some unsigned"),
            pass("", "fine"),
        ];
        let verdict = evaluate_outcomes(&outcomes, &facts(1, 2, 0)).unwrap();
        assert_eq!(verdict.status, Status::Warn);
        assert_eq!(verdict.message, "some unsigned");
    }

    #[test]
    fn test_branches_within_one_outcome() {
        let outcome = Outcome {
            fail: branch("errors > 0", "broken"),
            warn: None,
            pass: branch("", "fine"),
        };
        let verdict = evaluate_outcomes(&[outcome], &facts(1, 0, 0)).unwrap();
        assert_eq!(verdict.status, Status::Pass);
    }

    #[test]
    fn test_default_when_nothing_matches() {
        let outcomes = vec![fail("errors > 0", "broken")];
        let verdict = evaluate_outcomes(&outcomes, &facts(2, 0, 0)).unwrap();

        assert_eq!(verdict.status, Status::Pass);
        assert!(!verdict.matched);
        assert_eq!(verdict.message, "signed=2, unsigned=0, errors=0");

        let verdict = evaluate_outcomes(&[], &facts(0, 0, 0)).unwrap();
        assert!(!verdict.matched);
    }

    #[test]
    fn test_bad_condition_is_fatal_even_if_later_rule_matches() {
        let outcomes = vec![fail("bogus > 0", "broken"), pass("", "fine")];
        assert!(matches!(
            evaluate_outcomes(&outcomes, &facts(1, 0, 0)),
            Err(ConditionError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_first_fail() {
        let outcomes = vec![pass("", "fine"), fail("errors > 0", "broken"), fail("", "other")];
        assert_eq!(first_fail(&outcomes).unwrap().message, "broken");
        assert!(first_fail(&[pass("", "fine")]).is_none());
    }
}
