//! Admissions pipeline: enquiry intake, eligibility checks, interview
//! scheduling, decision lifecycle, and fee billing.
//!
//! The rule modules ([`eligibility`], [`scheduling`], [`lifecycle`],
//! [`billing`]) are pure; [`service::AdmissionsService`] composes them over
//! the repository seams so every mutation passes through the same rules.

pub mod billing;
pub mod domain;
pub mod eligibility;
pub mod lifecycle;
pub mod report;
pub mod repository;
pub mod router;
pub mod scheduling;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationIntake, ApplicationStatus, CounselorId, DocumentRecord,
    DocumentRequirement, DocumentStatus, Interview, InterviewId, InterviewMode, InterviewStatus,
    Invoice, InvoiceId, InvoiceStatus, Lead, LeadId, LeadIntake, LeadSource, LeadStatus, Payment,
    PaymentMethod, TimeOfDay, TimeParseError,
};
pub use eligibility::{age_on, AgeWindow, EligibilityCheck, EligibilityPolicy};
pub use lifecycle::{StatusTable, TransitionError, TransitionMode, TransitionReceipt};
pub use report::{FunnelReport, FunnelSummary};
pub use repository::{
    AdmissionsNotice, ApplicationRecord, ApplicationRepository, ApplicationStatusView,
    InterviewRepository, InvoiceRepository, LeadRepository, NotificationPublisher, NoticeError,
    RepositoryError,
};
pub use router::admissions_router;
pub use scheduling::{ConflictReport, CounselorConflict, DuplicateApplicantWarning, SlotRequest};
pub use service::{AdmissionsService, AdmissionsServiceError, ImportSummary};
