use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, Interview, InterviewId, Invoice, InvoiceId,
    Lead, LeadId,
};
use super::eligibility::EligibilityCheck;

/// Repository record pairing the applicant data with the pipeline status and
/// the eligibility check captured at submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub application: Application,
    pub status: ApplicationStatus,
    pub eligibility: Option<EligibilityCheck>,
}

impl ApplicationRecord {
    pub fn eligibility_note(&self) -> String {
        match &self.eligibility {
            Some(check) => check.message.clone(),
            None => "eligibility not assessed".to_string(),
        }
    }

    pub fn status_view(&self) -> ApplicationStatusView {
        ApplicationStatusView {
            application_id: self.application.id.clone(),
            applicant_name: self.application.applicant_name.clone(),
            status: self.status.label(),
            eligibility_note: self.eligibility_note(),
            documents: self
                .application
                .documents
                .iter()
                .map(|document| DocumentStatusView {
                    kind: document.kind.clone(),
                    mandatory: document.mandatory,
                    status: document.status.label(),
                })
                .collect(),
        }
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage seams per aggregate so the service module can be exercised in
/// isolation. The api crate supplies in-memory implementations.
pub trait LeadRepository: Send + Sync {
    fn insert(&self, lead: Lead) -> Result<Lead, RepositoryError>;
    fn update(&self, lead: Lead) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError>;
    fn list(&self) -> Result<Vec<Lead>, RepositoryError>;
}

pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

pub trait InterviewRepository: Send + Sync {
    fn insert(&self, interview: Interview) -> Result<Interview, RepositoryError>;
    fn update(&self, interview: Interview) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError>;
    fn list(&self) -> Result<Vec<Interview>, RepositoryError>;
}

pub trait InvoiceRepository: Send + Sync {
    fn insert(&self, invoice: Invoice) -> Result<Invoice, RepositoryError>;
    fn update(&self, invoice: Invoice) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &InvoiceId) -> Result<Option<Invoice>, RepositoryError>;
    fn list(&self) -> Result<Vec<Invoice>, RepositoryError>;
}

/// Trait describing outbound notification hooks (e-mail/SMS adapters live in
/// the api crate or beyond).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notice: AdmissionsNotice) -> Result<(), NoticeError>;
}

/// Simple notice payload so routes/tests can assert integration boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionsNotice {
    pub template: String,
    pub entity_id: String,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NoticeError {
    #[error("notice transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized representation of an application's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationStatusView {
    pub application_id: ApplicationId,
    pub applicant_name: String,
    pub status: &'static str,
    pub eligibility_note: String,
    pub documents: Vec<DocumentStatusView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentStatusView {
    pub kind: String,
    pub mandatory: bool,
    pub status: &'static str,
}
