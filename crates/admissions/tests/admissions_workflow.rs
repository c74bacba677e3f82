use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use admissions::workflows::admissions::{
    AdmissionsNotice, AdmissionsService, ApplicationId, ApplicationRecord, ApplicationRepository,
    ApplicationStatus, DocumentStatus, EligibilityPolicy, Interview, InterviewId,
    InterviewRepository, Invoice, InvoiceId, InvoiceRepository, InvoiceStatus, Lead, LeadId,
    LeadRepository, LeadStatus, NotificationPublisher, NoticeError, Payment, PaymentMethod,
    RepositoryError, TransitionMode,
};
use admissions::workflows::admissions::scheduling::SlotRequest;
use admissions::workflows::admissions::{CounselorId, InterviewMode};
use chrono::NaiveDate;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[derive(Default)]
struct MemoryLeads(Mutex<HashMap<LeadId, Lead>>);

impl LeadRepository for MemoryLeads {
    fn insert(&self, lead: Lead) -> Result<Lead, RepositoryError> {
        let mut guard = self.0.lock().expect("mutex poisoned");
        if guard.contains_key(&lead.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(lead.id.clone(), lead.clone());
        Ok(lead)
    }

    fn update(&self, lead: Lead) -> Result<(), RepositoryError> {
        self.0
            .lock()
            .expect("mutex poisoned")
            .insert(lead.id.clone(), lead);
        Ok(())
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError> {
        Ok(self.0.lock().expect("mutex poisoned").get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Lead>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("mutex poisoned")
            .values()
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct MemoryApplications(Mutex<HashMap<ApplicationId, ApplicationRecord>>);

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.0.lock().expect("mutex poisoned");
        if guard.contains_key(&record.application.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.application.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: ApplicationRecord) -> Result<(), RepositoryError> {
        self.0
            .lock()
            .expect("mutex poisoned")
            .insert(record.application.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Ok(self.0.lock().expect("mutex poisoned").get(id).cloned())
    }

    fn list(&self) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("mutex poisoned")
            .values()
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct MemoryInterviews(Mutex<HashMap<InterviewId, Interview>>);

impl InterviewRepository for MemoryInterviews {
    fn insert(&self, interview: Interview) -> Result<Interview, RepositoryError> {
        let mut guard = self.0.lock().expect("mutex poisoned");
        if guard.contains_key(&interview.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(interview.id.clone(), interview.clone());
        Ok(interview)
    }

    fn update(&self, interview: Interview) -> Result<(), RepositoryError> {
        self.0
            .lock()
            .expect("mutex poisoned")
            .insert(interview.id.clone(), interview);
        Ok(())
    }

    fn fetch(&self, id: &InterviewId) -> Result<Option<Interview>, RepositoryError> {
        Ok(self.0.lock().expect("mutex poisoned").get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Interview>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("mutex poisoned")
            .values()
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct MemoryInvoices(Mutex<HashMap<InvoiceId, Invoice>>);

impl InvoiceRepository for MemoryInvoices {
    fn insert(&self, invoice: Invoice) -> Result<Invoice, RepositoryError> {
        let mut guard = self.0.lock().expect("mutex poisoned");
        if guard.contains_key(&invoice.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(invoice.id.clone(), invoice.clone());
        Ok(invoice)
    }

    fn update(&self, invoice: Invoice) -> Result<(), RepositoryError> {
        self.0
            .lock()
            .expect("mutex poisoned")
            .insert(invoice.id.clone(), invoice);
        Ok(())
    }

    fn fetch(&self, id: &InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        Ok(self.0.lock().expect("mutex poisoned").get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Invoice>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("mutex poisoned")
            .values()
            .cloned()
            .collect())
    }
}

#[derive(Default)]
struct MemoryNotices(Mutex<Vec<AdmissionsNotice>>);

impl MemoryNotices {
    fn events(&self) -> Vec<AdmissionsNotice> {
        self.0.lock().expect("mutex poisoned").clone()
    }
}

impl NotificationPublisher for MemoryNotices {
    fn publish(&self, notice: AdmissionsNotice) -> Result<(), NoticeError> {
        self.0.lock().expect("mutex poisoned").push(notice);
        Ok(())
    }
}

#[test]
fn enquiry_to_enrollment_walks_the_full_pipeline() {
    let leads = Arc::new(MemoryLeads::default());
    let applications = Arc::new(MemoryApplications::default());
    let interviews = Arc::new(MemoryInterviews::default());
    let invoices = Arc::new(MemoryInvoices::default());
    let notices = Arc::new(MemoryNotices::default());
    let policy = EligibilityPolicy::standard(date(2025, 4, 1));
    let service = AdmissionsService::new(
        leads,
        applications,
        interviews,
        invoices,
        notices.clone(),
        policy,
    );
    let today = date(2025, 6, 20);

    // A front-office CSV export seeds the board.
    let csv = "Student Name,Parent Name,Contact,Class,Enquiry Date,Source,Date of Birth\n\
Aarav Mehta,Rohit Mehta,9876500001,Class 1,2025-06-14,Walk In,2019-05-15\n";
    let summary = service
        .import_enquiries(Cursor::new(csv), today)
        .expect("import succeeds");
    assert_eq!(summary.imported.len(), 1);
    let lead_id = summary.imported[0].clone();

    // Work the lead across the board, then convert it.
    for status in [LeadStatus::Contacted, LeadStatus::Qualified] {
        service
            .move_lead(&lead_id, status, TransitionMode::Standard)
            .expect("board move passes");
    }
    let record = service
        .convert_lead(
            &lead_id,
            vec![admissions::workflows::admissions::DocumentRequirement {
                kind: "Birth Certificate".to_string(),
                mandatory: true,
            }],
        )
        .expect("qualified lead converts");
    let application_id = record.application.id.clone();
    assert_eq!(record.status, ApplicationStatus::Draft);

    // Submission computes the eligibility check from the imported birth date.
    let (record, _) = service
        .transition_application(
            &application_id,
            ApplicationStatus::Submitted,
            TransitionMode::Standard,
        )
        .expect("draft submits");
    assert_eq!(
        record.eligibility.expect("check captured").message,
        "Age 5: Eligible (5-7)"
    );

    service
        .transition_application(
            &application_id,
            ApplicationStatus::UnderReview,
            TransitionMode::Standard,
        )
        .expect("review starts");

    // Book the interview, survive a counselor clash, and complete it.
    service
        .schedule_interview(
            SlotRequest {
                applicant_name: "Aarav Mehta".to_string(),
                counselor_id: CounselorId("c1".to_string()),
                date: date(2025, 6, 25),
                start: "10:00".parse().expect("valid time"),
                end: "10:30".parse().expect("valid time"),
                mode: InterviewMode::InPerson,
                location: "Counseling Room 2".to_string(),
            },
            false,
        )
        .expect("interview books");
    service
        .transition_application(
            &application_id,
            ApplicationStatus::Interview,
            TransitionMode::Standard,
        )
        .expect("interview stage");

    // Verify the mandatory document so the offer clears the guard.
    service
        .update_document(
            &application_id,
            "Birth Certificate",
            DocumentStatus::Uploaded,
            TransitionMode::Standard,
        )
        .expect("upload");
    service
        .update_document(
            &application_id,
            "Birth Certificate",
            DocumentStatus::Verified,
            TransitionMode::Standard,
        )
        .expect("verify");
    service
        .transition_application(
            &application_id,
            ApplicationStatus::OfferSent,
            TransitionMode::Standard,
        )
        .expect("offer goes out");

    // Fees: issue, collect in two installments, settle.
    let invoice = service
        .issue_invoice(application_id.clone(), 55000, 5000, date(2025, 7, 15), today)
        .expect("invoice issues");
    service
        .record_payment(
            &invoice.id,
            Payment {
                amount: 20000,
                method: PaymentMethod::Cash,
                received_on: date(2025, 6, 25),
            },
            date(2025, 6, 25),
        )
        .expect("first installment");
    let invoice = service
        .record_payment(
            &invoice.id,
            Payment {
                amount: 30000,
                method: PaymentMethod::BankTransfer,
                received_on: date(2025, 6, 28),
            },
            date(2025, 6, 28),
        )
        .expect("second installment");
    assert_eq!(invoice.status, InvoiceStatus::Paid);

    service
        .transition_application(
            &application_id,
            ApplicationStatus::Enrolled,
            TransitionMode::Standard,
        )
        .expect("enrollment completes");

    // Both milestone notices fired along the way.
    let templates: Vec<String> = notices
        .events()
        .into_iter()
        .map(|notice| notice.template)
        .collect();
    assert_eq!(templates, vec!["offer_sent", "invoice_settled"]);

    // The dashboard reflects the finished pipeline.
    let report = service.funnel_report(today).expect("report builds");
    assert_eq!(report.lead_counts.get(&LeadStatus::Converted), Some(&1));
    assert_eq!(
        report.application_counts.get(&ApplicationStatus::Enrolled),
        Some(&1)
    );
    assert_eq!(report.documents.mandatory_verified, 1);
    assert_eq!(report.billing.outstanding, 0);
}
