use std::env;

use log::warn;
use paystack_tools::SubaccountShare;
use serde::{Deserialize, Serialize};
use sfp_common::Kobo;

use crate::sfe_api::PaymentFlowError;

/// Claimed amounts within this margin of the expected total are accepted. Absorbs float representation
/// noise from upstream JSON.
pub const AMOUNT_TOLERANCE: f64 = 0.01;

/// The subaccount codes that split shares get routed to. Each is optional at load time; a flow that needs
/// an unset account fails with [`PaymentFlowError::ConfigError`] at request time rather than at startup.
#[derive(Debug, Clone, Default)]
pub struct SubaccountConfig {
    pub tuition_account: Option<String>,
    pub club_account: Option<String>,
    pub exam_account: Option<String>,
    pub sat_account: Option<String>,
}

impl SubaccountConfig {
    pub fn from_env_or_default() -> Self {
        let get = |var: &str| match env::var(var) {
            Ok(v) if !v.trim().is_empty() => Some(v),
            _ => {
                warn!("🤔 {var} is not set. Payments that route to this account will be rejected.");
                None
            },
        };
        Self {
            tuition_account: get("SFS_TUITION_ACCOUNT"),
            club_account: get("SFS_CLUB_ACCOUNT"),
            exam_account: get("SFS_EXAM_ACCOUNT"),
            sat_account: get("SFS_SAT_ACCOUNT"),
        }
    }
}

/// Where the gateway redirects the payer after checkout.
#[derive(Debug, Clone, Default)]
pub struct CallbackConfig {
    pub school_fees_url: Option<String>,
    pub exam_fees_url: Option<String>,
}

impl CallbackConfig {
    pub fn from_env_or_default() -> Self {
        Self {
            school_fees_url: env::var("SFS_SCHOOL_FEES_CALLBACK_URL").ok(),
            exam_fees_url: env::var("SFS_EXAM_FEES_CALLBACK_URL").ok(),
        }
    }
}

/// Everything the orchestration layer needs besides its database and gateway handles.
#[derive(Debug, Clone, Default)]
pub struct FlowConfig {
    pub accounts: SubaccountConfig,
    pub callbacks: CallbackConfig,
}

impl FlowConfig {
    pub fn from_env_or_default() -> Self {
        Self { accounts: SubaccountConfig::from_env_or_default(), callbacks: CallbackConfig::from_env_or_default() }
    }
}

/// Build the split for a school-fees checkout. The tuition share goes to the tuition account and the
/// club share, when nonzero, to the club account.
pub fn school_fees_split(
    tuition: Kobo,
    clubs: Kobo,
    accounts: &SubaccountConfig,
) -> Result<Vec<SubaccountShare>, PaymentFlowError> {
    let tuition_account = accounts
        .tuition_account
        .clone()
        .ok_or_else(|| PaymentFlowError::ConfigError("No tuition subaccount is configured".to_string()))?;
    let mut shares = vec![SubaccountShare { subaccount: tuition_account, share: tuition }];
    if clubs > Kobo::default() {
        let club_account = accounts
            .club_account
            .clone()
            .ok_or_else(|| PaymentFlowError::ConfigError("No club subaccount is configured".to_string()))?;
        shares.push(SubaccountShare { subaccount: club_account, share: clubs });
    }
    Ok(shares)
}

/// Pick the destination subaccount for one exam by keyword match on its name.
///
/// Matching is case-insensitive and first-match-wins in the order igcse, checkpoint, sat, ielts.
/// Unrecognized exam names fall back to the general exam account.
pub fn route_exam_account<'a>(
    exam_name: &str,
    accounts: &'a SubaccountConfig,
) -> Result<&'a str, PaymentFlowError> {
    let name = exam_name.to_lowercase();
    let routed = if name.contains("igcse") || name.contains("checkpoint") {
        accounts.exam_account.as_deref()
    } else if name.contains("sat") || name.contains("ielts") {
        accounts.sat_account.as_deref()
    } else {
        accounts.exam_account.as_deref()
    };
    routed.ok_or_else(|| {
        PaymentFlowError::ConfigError(format!("No subaccount is configured for exam \"{exam_name}\""))
    })
}

/// One exam's contribution to a split, kept for the metadata record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamShareLine {
    pub exam_id: String,
    pub exam_name: String,
    pub share: Kobo,
}

/// Build the consolidated split for an exam-fees checkout. Exams routing to the same subaccount are
/// merged into a single share; shares keep the order in which their account was first seen.
pub fn exam_fees_split(
    lines: &[ExamShareLine],
    accounts: &SubaccountConfig,
) -> Result<Vec<SubaccountShare>, PaymentFlowError> {
    let mut shares: Vec<SubaccountShare> = Vec::new();
    for line in lines {
        let account = route_exam_account(&line.exam_name, accounts)?;
        match shares.iter_mut().find(|s| s.subaccount == account) {
            Some(existing) => existing.share += line.share,
            None => shares.push(SubaccountShare { subaccount: account.to_string(), share: line.share }),
        }
    }
    Ok(shares)
}

#[cfg(test)]
mod test {
    use super::*;

    fn accounts() -> SubaccountConfig {
        SubaccountConfig {
            tuition_account: Some("ACCT_tuition".to_string()),
            club_account: Some("ACCT_clubs".to_string()),
            exam_account: Some("ACCT_exams".to_string()),
            sat_account: Some("ACCT_sat".to_string()),
        }
    }

    #[test]
    fn school_fees_split_omits_zero_club_share() {
        let shares = school_fees_split(Kobo::from(500_000_00), Kobo::default(), &accounts()).unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].subaccount, "ACCT_tuition");
        assert_eq!(shares[0].share, Kobo::from(500_000_00));
    }

    #[test]
    fn school_fees_split_carries_club_share() {
        let shares = school_fees_split(Kobo::from(500_000_00), Kobo::from(20_000_00), &accounts()).unwrap();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[1].subaccount, "ACCT_clubs");
        assert_eq!(shares[1].share, Kobo::from(20_000_00));
    }

    #[test]
    fn school_fees_split_requires_tuition_account() {
        let accounts = SubaccountConfig::default();
        let err = school_fees_split(Kobo::from(100), Kobo::default(), &accounts).unwrap_err();
        assert!(matches!(err, PaymentFlowError::ConfigError(_)));
    }

    #[test]
    fn exam_routing_is_case_insensitive_and_keyword_based() {
        let accounts = accounts();
        assert_eq!(route_exam_account("IGCSE May 2026", &accounts).unwrap(), "ACCT_exams");
        assert_eq!(route_exam_account("Checkpoint Lower Secondary", &accounts).unwrap(), "ACCT_exams");
        assert_eq!(route_exam_account("Digital SAT", &accounts).unwrap(), "ACCT_sat");
        assert_eq!(route_exam_account("ielts academic", &accounts).unwrap(), "ACCT_sat");
        assert_eq!(route_exam_account("Mock Examination", &accounts).unwrap(), "ACCT_exams");
    }

    #[test]
    fn exam_split_consolidates_per_account() {
        let lines = [
            ExamShareLine {
                exam_id: "e1".to_string(),
                exam_name: "IGCSE May 2026".to_string(),
                share: Kobo::from(15_000_00),
            },
            ExamShareLine {
                exam_id: "e2".to_string(),
                exam_name: "Checkpoint".to_string(),
                share: Kobo::from(10_000_00),
            },
            ExamShareLine { exam_id: "e3".to_string(), exam_name: "SAT".to_string(), share: Kobo::from(20_000_00) },
        ];
        let shares = exam_fees_split(&lines, &accounts()).unwrap();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].subaccount, "ACCT_exams");
        assert_eq!(shares[0].share, Kobo::from(25_000_00));
        assert_eq!(shares[1].subaccount, "ACCT_sat");
        assert_eq!(shares[1].share, Kobo::from(20_000_00));
    }
}
