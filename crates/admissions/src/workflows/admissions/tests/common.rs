use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::admissions::domain::{
    ApplicationId, ApplicationIntake, CounselorId, DocumentRequirement, Interview, InterviewId,
    InterviewMode, Invoice, InvoiceId, Lead, LeadId, LeadIntake, LeadSource, TimeOfDay,
};
use crate::workflows::admissions::eligibility::EligibilityPolicy;
use crate::workflows::admissions::repository::{
    AdmissionsNotice, ApplicationRecord, ApplicationRepository, InterviewRepository,
    InvoiceRepository, LeadRepository, NotificationPublisher, NoticeError, RepositoryError,
};
use crate::workflows::admissions::scheduling::SlotRequest;
use crate::workflows::admissions::service::AdmissionsService;

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn time(value: &str) -> TimeOfDay {
    value.parse().expect("valid HH:MM time")
}

pub(super) fn reference_date() -> NaiveDate {
    date(2025, 4, 1)
}

pub(super) fn policy() -> EligibilityPolicy {
    EligibilityPolicy::standard(reference_date())
}

pub(super) fn lead_intake(student_name: &str) -> LeadIntake {
    LeadIntake {
        student_name: student_name.to_string(),
        parent_name: "Rohit Mehta".to_string(),
        contact: "9876500001".to_string(),
        class_applied: "Class 1".to_string(),
        source: LeadSource::WalkIn,
        enquiry_date: Some(date(2025, 6, 14)),
        follow_up_on: None,
        date_of_birth: Some(date(2019, 5, 15)),
    }
}

pub(super) fn application_intake(applicant_name: &str) -> ApplicationIntake {
    ApplicationIntake {
        applicant_name: applicant_name.to_string(),
        date_of_birth: Some(date(2019, 5, 15)),
        target_class: "Class 1".to_string(),
        documents: vec![
            DocumentRequirement {
                kind: "Birth Certificate".to_string(),
                mandatory: true,
            },
            DocumentRequirement {
                kind: "Photograph".to_string(),
                mandatory: false,
            },
        ],
    }
}

pub(super) fn slot(
    applicant_name: &str,
    counselor: &str,
    on: NaiveDate,
    start: &str,
    end: &str,
) -> SlotRequest {
    SlotRequest {
        applicant_name: applicant_name.to_string(),
        counselor_id: CounselorId(counselor.to_string()),
        date: on,
        start: time(start),
        end: time(end),
        mode: InterviewMode::InPerson,
        location: "Counseling Room 2".to_string(),
    }
}

pub(super) type TestService = AdmissionsService<
    MemoryLeads,
    MemoryApplications,
    MemoryInterviews,
    MemoryInvoices,
    MemoryNotices,
>;

pub(super) struct TestHarness {
    pub(super) service: TestService,
    pub(super) notices: Arc<MemoryNotices>,
}

pub(super) fn build_service() -> TestHarness {
    let notices = Arc::new(MemoryNotices::default());
    let service = AdmissionsService::new(
        Arc::new(MemoryLeads::default()),
        Arc::new(MemoryApplications::default()),
        Arc::new(MemoryInterviews::default()),
        Arc::new(MemoryInvoices::default()),
        notices.clone(),
        policy(),
    );
    TestHarness { service, notices }
}

#[derive(Default, Clone)]
pub(super) struct MemoryLeads {
    records: Arc<Mutex<HashMap<LeadId, Lead>>>,
}

impl LeadRepository for MemoryLeads {
    fn insert(&self, lead: Lead) -> Result<Lead, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&lead.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(lead.id.clone(), lead.clone());
        Ok(lead)
    }

    fn update(&self, lead: Lead) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&lead.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(lead.id.clone(), lead);
        Ok(())
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Lead>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryApplications {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.application.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&record.application.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.application.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryInterviews {
    records: Arc<Mutex<HashMap<InterviewId, Interview>>>,
}

impl InterviewRepository for MemoryInterviews {
    fn insert(&self, interview: Interview) -> Result<Interview, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&interview.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(interview.id.clone(), interview.clone());
        Ok(interview)
    }

    fn update(&self, interview: Interview) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&interview.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(interview.id.clone(), interview);
        Ok(())
    }

    fn fetch(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Interview>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryInvoices {
    records: Arc<Mutex<HashMap<InvoiceId, Invoice>>>,
}

impl InvoiceRepository for MemoryInvoices {
    fn insert(&self, invoice: Invoice) -> Result<Invoice, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&invoice.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(invoice.id.clone(), invoice.clone());
        Ok(invoice)
    }

    fn update(&self, invoice: Invoice) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&invoice.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(invoice.id.clone(), invoice);
        Ok(())
    }

    fn fetch(&self, id: &InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Invoice>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotices {
    events: Arc<Mutex<Vec<AdmissionsNotice>>>,
}

impl MemoryNotices {
    pub(super) fn events(&self) -> Vec<AdmissionsNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotices {
    fn publish(&self, notice: AdmissionsNotice) -> Result<(), NoticeError> {
        self.events
            .lock()
            .expect("notice mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(super) fn assert_conflict_response(response: &Response) {
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
