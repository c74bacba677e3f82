//! Transition tables for the admissions status enums.
//!
//! Statuses used to be freely settable from any screen; every move now passes
//! through [`transition`], which rejects pairs outside the table unless the
//! caller explicitly overrides, and records the override on the receipt.

use super::domain::{
    ApplicationStatus, DocumentRecord, DocumentStatus, InterviewStatus, LeadStatus,
};
use serde::{Deserialize, Serialize};

/// How a requested status change is validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    #[default]
    Standard,
    Override,
}

/// A status enum with an explicit allowed-successor table.
pub trait StatusTable: Copy + PartialEq + 'static {
    fn successors(self) -> &'static [Self];
    fn status_label(self) -> &'static str;

    fn can_transition_to(self, next: Self) -> bool {
        self.successors().contains(&next)
    }
}

impl StatusTable for LeadStatus {
    fn successors(self) -> &'static [Self] {
        match self {
            Self::New => &[Self::Contacted, Self::Lost],
            Self::Contacted => &[Self::Qualified, Self::Lost],
            Self::Qualified => &[Self::ApplicationStarted, Self::Converted, Self::Lost],
            Self::ApplicationStarted => &[Self::Converted, Self::Lost],
            Self::Converted => &[],
            Self::Lost => &[Self::Contacted],
        }
    }

    fn status_label(self) -> &'static str {
        self.label()
    }
}

impl StatusTable for ApplicationStatus {
    fn successors(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Submitted],
            Self::Submitted => &[Self::UnderReview, Self::Rejected],
            Self::UnderReview => &[Self::Interview, Self::Waitlisted, Self::Rejected],
            Self::Interview => &[Self::OfferSent, Self::Waitlisted, Self::Rejected],
            Self::OfferSent => &[Self::Enrolled, Self::Waitlisted, Self::Rejected],
            Self::Waitlisted => &[
                Self::UnderReview,
                Self::Interview,
                Self::OfferSent,
                Self::Rejected,
            ],
            Self::Rejected => &[],
            Self::Enrolled => &[],
        }
    }

    fn status_label(self) -> &'static str {
        self.label()
    }
}

impl StatusTable for DocumentStatus {
    fn successors(self) -> &'static [Self] {
        match self {
            Self::Missing => &[Self::Uploaded],
            Self::Uploaded => &[Self::Verified, Self::Rejected],
            Self::Rejected => &[Self::Uploaded],
            Self::Verified => &[],
        }
    }

    fn status_label(self) -> &'static str {
        self.label()
    }
}

impl StatusTable for InterviewStatus {
    fn successors(self) -> &'static [Self] {
        match self {
            Self::Scheduled => &[Self::Completed, Self::Cancelled, Self::NoShow],
            Self::NoShow => &[Self::Scheduled],
            Self::Completed => &[],
            Self::Cancelled => &[],
        }
    }

    fn status_label(self) -> &'static str {
        self.label()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("transition from {from} to {to} is not allowed")]
    NotAllowed {
        from: &'static str,
        to: &'static str,
    },
    #[error("offer requires verified mandatory documents; unverified: {}", .missing.join(", "))]
    DocumentsUnverified { missing: Vec<String> },
}

/// Result of a validated status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionReceipt<S> {
    pub from: S,
    pub to: S,
    pub overridden: bool,
    pub warnings: Vec<String>,
}

/// Validate a status change against the table. Standard mode rejects pairs
/// outside it; override mode permits them and flags the receipt.
pub fn transition<S: StatusTable>(
    from: S,
    to: S,
    mode: TransitionMode,
) -> Result<TransitionReceipt<S>, TransitionError> {
    let listed = from.can_transition_to(to);

    match mode {
        TransitionMode::Standard if !listed => Err(TransitionError::NotAllowed {
            from: from.status_label(),
            to: to.status_label(),
        }),
        TransitionMode::Standard => Ok(TransitionReceipt {
            from,
            to,
            overridden: false,
            warnings: Vec::new(),
        }),
        TransitionMode::Override => {
            let warnings = if listed {
                Vec::new()
            } else {
                vec![format!(
                    "{} to {} recorded as manual override",
                    from.status_label(),
                    to.status_label()
                )]
            };
            Ok(TransitionReceipt {
                from,
                to,
                overridden: !listed,
                warnings,
            })
        }
    }
}

/// Mandatory documents not yet verified, by kind.
pub fn unverified_mandatory(documents: &[DocumentRecord]) -> Vec<String> {
    documents
        .iter()
        .filter(|document| document.mandatory && document.status != DocumentStatus::Verified)
        .map(|document| document.kind.clone())
        .collect()
}

/// Application transitions add one guard on top of the table: an offer should
/// not go out while mandatory documents are unverified. Overriding the guard
/// succeeds but carries the unverified kinds as warnings.
pub fn transition_application(
    from: ApplicationStatus,
    to: ApplicationStatus,
    documents: &[DocumentRecord],
    mode: TransitionMode,
) -> Result<TransitionReceipt<ApplicationStatus>, TransitionError> {
    let mut receipt = transition(from, to, mode)?;

    if to == ApplicationStatus::OfferSent {
        let missing = unverified_mandatory(documents);
        if !missing.is_empty() {
            match mode {
                TransitionMode::Standard => {
                    return Err(TransitionError::DocumentsUnverified { missing })
                }
                TransitionMode::Override => {
                    receipt.overridden = true;
                    receipt.warnings.push(format!(
                        "offer sent with unverified mandatory documents: {}",
                        missing.join(", ")
                    ));
                }
            }
        }
    }

    Ok(receipt)
}
