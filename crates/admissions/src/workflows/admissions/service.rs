use std::io::Read;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use super::billing::{self, BillingError};
use super::domain::{
    Application, ApplicationId, ApplicationIntake, ApplicationStatus, DocumentRecord,
    DocumentRequirement, DocumentStatus, Interview, InterviewId, InterviewStatus, Invoice,
    InvoiceId, InvoiceStatus, Lead, LeadId, LeadIntake, LeadStatus, Payment,
};
use super::eligibility::EligibilityPolicy;
use super::lifecycle::{self, TransitionError, TransitionMode, TransitionReceipt};
use super::report::FunnelReport;
use super::repository::{
    AdmissionsNotice, ApplicationRecord, ApplicationRepository, ApplicationStatusView,
    InterviewRepository, InvoiceRepository, LeadRepository, NotificationPublisher, NoticeError,
    RepositoryError,
};
use super::scheduling::{detect_conflicts, ConflictReport, SlotError, SlotRequest};
use crate::workflows::enquiries::{EnquiryImportError, EnquiryImporter};

/// Service composing the eligibility policy, conflict detector, and lifecycle
/// tables over the repositories, so every mutation flows through one place.
pub struct AdmissionsService<L, A, I, V, N> {
    leads: Arc<L>,
    applications: Arc<A>,
    interviews: Arc<I>,
    invoices: Arc<V>,
    notices: Arc<N>,
    policy: EligibilityPolicy,
}

static LEAD_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static INTERVIEW_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static INVOICE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_lead_id() -> LeadId {
    let id = LEAD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    LeadId(format!("lead-{id:06}"))
}

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

fn next_interview_id() -> InterviewId {
    let id = INTERVIEW_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    InterviewId(format!("int-{id:06}"))
}

fn next_invoice_id() -> InvoiceId {
    let id = INVOICE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    InvoiceId(format!("inv-{id:06}"))
}

/// Per-row outcome of a CSV enquiry import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: Vec<LeadId>,
    pub skipped: usize,
}

impl<L, A, I, V, N> AdmissionsService<L, A, I, V, N>
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(
        leads: Arc<L>,
        applications: Arc<A>,
        interviews: Arc<I>,
        invoices: Arc<V>,
        notices: Arc<N>,
        policy: EligibilityPolicy,
    ) -> Self {
        Self {
            leads,
            applications,
            interviews,
            invoices,
            notices,
            policy,
        }
    }

    pub fn eligibility_policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    /// Register a single enquiry, defaulting the enquiry date to today.
    pub fn register_lead(
        &self,
        intake: LeadIntake,
        today: NaiveDate,
    ) -> Result<Lead, AdmissionsServiceError> {
        let lead = Lead {
            id: next_lead_id(),
            student_name: intake.student_name,
            parent_name: intake.parent_name,
            contact: intake.contact,
            class_applied: intake.class_applied,
            source: intake.source,
            status: LeadStatus::New,
            enquiry_date: intake.enquiry_date.unwrap_or(today),
            follow_up_on: intake.follow_up_on,
            date_of_birth: intake.date_of_birth,
        };
        Ok(self.leads.insert(lead)?)
    }

    /// Bulk-register leads from a CSV enquiry export.
    pub fn import_enquiries<R: Read>(
        &self,
        reader: R,
        today: NaiveDate,
    ) -> Result<ImportSummary, AdmissionsServiceError> {
        let batch = EnquiryImporter::from_reader(reader)?;
        let mut imported = Vec::with_capacity(batch.leads.len());
        for intake in batch.leads {
            let lead = self.register_lead(intake, today)?;
            imported.push(lead.id);
        }
        Ok(ImportSummary {
            imported,
            skipped: batch.skipped,
        })
    }

    /// Move a lead across the board, validated against the lead table.
    pub fn move_lead(
        &self,
        id: &LeadId,
        to: LeadStatus,
        mode: TransitionMode,
    ) -> Result<(Lead, TransitionReceipt<LeadStatus>), AdmissionsServiceError> {
        let mut lead = self.leads.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        let receipt = lifecycle::transition(lead.status, to, mode)?;
        lead.status = to;
        self.leads.update(lead.clone())?;
        Ok((lead, receipt))
    }

    /// Convert a qualified lead into a draft application, copying the
    /// applicant details across.
    pub fn convert_lead(
        &self,
        id: &LeadId,
        documents: Vec<DocumentRequirement>,
    ) -> Result<ApplicationRecord, AdmissionsServiceError> {
        let mut lead = self.leads.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        lifecycle::transition(lead.status, LeadStatus::Converted, TransitionMode::Standard)?;

        let record = ApplicationRecord {
            application: Application {
                id: next_application_id(),
                applicant_name: lead.student_name.clone(),
                date_of_birth: lead.date_of_birth,
                target_class: lead.class_applied.clone(),
                documents: documents.into_iter().map(DocumentRecord::missing).collect(),
            },
            status: ApplicationStatus::Draft,
            eligibility: None,
        };
        let stored = self.applications.insert(record)?;

        lead.status = LeadStatus::Converted;
        self.leads.update(lead)?;
        Ok(stored)
    }

    /// Submit a new application directly, running the eligibility check as
    /// part of intake.
    pub fn submit_application(
        &self,
        intake: ApplicationIntake,
    ) -> Result<ApplicationRecord, AdmissionsServiceError> {
        let eligibility = self
            .policy
            .check(intake.date_of_birth, &intake.target_class);

        let record = ApplicationRecord {
            application: Application {
                id: next_application_id(),
                applicant_name: intake.applicant_name,
                date_of_birth: intake.date_of_birth,
                target_class: intake.target_class,
                documents: intake
                    .documents
                    .into_iter()
                    .map(DocumentRecord::missing)
                    .collect(),
            },
            status: ApplicationStatus::Submitted,
            eligibility: Some(eligibility),
        };
        Ok(self.applications.insert(record)?)
    }

    /// Fetch an application and current status for API responses.
    pub fn application_status(
        &self,
        id: &ApplicationId,
    ) -> Result<ApplicationStatusView, AdmissionsServiceError> {
        let record = self
            .applications
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record.status_view())
    }

    /// Advance an application through the pipeline. The offer guard and the
    /// transition table both apply; overrides are recorded on the receipt.
    pub fn transition_application(
        &self,
        id: &ApplicationId,
        to: ApplicationStatus,
        mode: TransitionMode,
    ) -> Result<(ApplicationRecord, TransitionReceipt<ApplicationStatus>), AdmissionsServiceError>
    {
        let mut record = self
            .applications
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        let receipt = lifecycle::transition_application(
            record.status,
            to,
            &record.application.documents,
            mode,
        )?;

        record.status = to;
        if to == ApplicationStatus::Submitted && record.eligibility.is_none() {
            record.eligibility = Some(self.policy.check(
                record.application.date_of_birth,
                &record.application.target_class,
            ));
        }
        self.applications.update(record.clone())?;

        if to == ApplicationStatus::OfferSent {
            let mut details = std::collections::BTreeMap::new();
            details.insert(
                "applicant".to_string(),
                record.application.applicant_name.clone(),
            );
            if receipt.overridden {
                details.insert("overridden".to_string(), "true".to_string());
            }
            self.notices.publish(AdmissionsNotice {
                template: "offer_sent".to_string(),
                entity_id: record.application.id.0.clone(),
                details,
            })?;
        }

        Ok((record, receipt))
    }

    /// Move one supporting document through its verification lifecycle.
    pub fn update_document(
        &self,
        id: &ApplicationId,
        kind: &str,
        to: DocumentStatus,
        mode: TransitionMode,
    ) -> Result<(ApplicationRecord, TransitionReceipt<DocumentStatus>), AdmissionsServiceError>
    {
        let mut record = self
            .applications
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        let document = record
            .application
            .documents
            .iter_mut()
            .find(|document| document.kind == kind)
            .ok_or_else(|| AdmissionsServiceError::UnknownDocument {
                kind: kind.to_string(),
            })?;

        let receipt = lifecycle::transition(document.status, to, mode)?;
        document.status = to;
        self.applications.update(record.clone())?;
        Ok((record, receipt))
    }

    /// Book an interview slot. Counselor double-bookings block outright;
    /// duplicate-applicant warnings block until acknowledged.
    pub fn schedule_interview(
        &self,
        slot: SlotRequest,
        acknowledge_warnings: bool,
    ) -> Result<Interview, AdmissionsServiceError> {
        slot.validate()?;
        let existing = self.interviews.list()?;
        let report = detect_conflicts(&slot, &existing, None);
        self.reject_conflicts(report, acknowledge_warnings)?;

        let interview = Interview {
            id: next_interview_id(),
            applicant_name: slot.applicant_name,
            counselor_id: slot.counselor_id,
            date: slot.date,
            start: slot.start,
            end: slot.end,
            mode: slot.mode,
            location: slot.location,
            status: InterviewStatus::Scheduled,
        };
        Ok(self.interviews.insert(interview)?)
    }

    /// Move an open interview to a new slot, running the same checks with the
    /// interview itself excluded from the scan.
    pub fn reschedule_interview(
        &self,
        id: &InterviewId,
        slot: SlotRequest,
        acknowledge_warnings: bool,
    ) -> Result<Interview, AdmissionsServiceError> {
        slot.validate()?;
        let mut interview = self.interviews.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        if interview.status != InterviewStatus::Scheduled {
            return Err(AdmissionsServiceError::InterviewClosed {
                status: interview.status.label(),
            });
        }

        let existing = self.interviews.list()?;
        let report = detect_conflicts(&slot, &existing, Some(id));
        self.reject_conflicts(report, acknowledge_warnings)?;

        interview.applicant_name = slot.applicant_name;
        interview.counselor_id = slot.counselor_id;
        interview.date = slot.date;
        interview.start = slot.start;
        interview.end = slot.end;
        interview.mode = slot.mode;
        interview.location = slot.location;
        self.interviews.update(interview.clone())?;
        Ok(interview)
    }

    /// Complete, cancel, or mark an interview as a no-show.
    pub fn close_interview(
        &self,
        id: &InterviewId,
        to: InterviewStatus,
        mode: TransitionMode,
    ) -> Result<(Interview, TransitionReceipt<InterviewStatus>), AdmissionsServiceError> {
        let mut interview = self.interviews.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        let receipt = lifecycle::transition(interview.status, to, mode)?;
        interview.status = to;
        self.interviews.update(interview.clone())?;
        Ok((interview, receipt))
    }

    /// Raise an invoice against an existing application.
    pub fn issue_invoice(
        &self,
        application_id: ApplicationId,
        amount: u32,
        discount: u32,
        due_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<Invoice, AdmissionsServiceError> {
        self.applications
            .fetch(&application_id)?
            .ok_or(RepositoryError::NotFound)?;

        let invoice = billing::issue(
            next_invoice_id(),
            application_id,
            amount,
            discount,
            due_date,
            today,
        )?;
        Ok(self.invoices.insert(invoice)?)
    }

    /// Record a payment; the invoice status is re-derived, and settlement
    /// publishes a notice.
    pub fn record_payment(
        &self,
        id: &InvoiceId,
        payment: Payment,
        today: NaiveDate,
    ) -> Result<Invoice, AdmissionsServiceError> {
        let mut invoice = self.invoices.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        let status = billing::record_payment(&mut invoice, payment, today)?;
        self.invoices.update(invoice.clone())?;

        if status == InvoiceStatus::Paid {
            let mut details = std::collections::BTreeMap::new();
            details.insert(
                "final_amount".to_string(),
                invoice.final_amount().to_string(),
            );
            self.notices.publish(AdmissionsNotice {
                template: "invoice_settled".to_string(),
                entity_id: invoice.id.0.clone(),
                details,
            })?;
        }

        Ok(invoice)
    }

    pub fn void_invoice(&self, id: &InvoiceId) -> Result<Invoice, AdmissionsServiceError> {
        let mut invoice = self.invoices.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        billing::void(&mut invoice)?;
        self.invoices.update(invoice.clone())?;
        Ok(invoice)
    }

    /// Dashboard snapshot across the whole pipeline.
    pub fn funnel_report(&self, today: NaiveDate) -> Result<FunnelReport, AdmissionsServiceError> {
        let leads = self.leads.list()?;
        let applications = self.applications.list()?;
        let interviews = self.interviews.list()?;
        let invoices = self.invoices.list()?;
        Ok(FunnelReport::build(
            &leads,
            &applications,
            &interviews,
            &invoices,
            today,
        ))
    }

    fn reject_conflicts(
        &self,
        report: ConflictReport,
        acknowledge_warnings: bool,
    ) -> Result<(), AdmissionsServiceError> {
        if report.blocks_save() {
            return Err(AdmissionsServiceError::ScheduleConflict(report));
        }
        if report.needs_confirmation() && !acknowledge_warnings {
            return Err(AdmissionsServiceError::DuplicateApplicant(report));
        }
        Ok(())
    }
}

/// Error raised by the admissions service.
#[derive(Debug, thiserror::Error)]
pub enum AdmissionsServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Billing(#[from] BillingError),
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error(transparent)]
    Notice(#[from] NoticeError),
    #[error(transparent)]
    Import(#[from] EnquiryImportError),
    #[error("slot conflicts with {} existing interview(s)", .0.conflicts.len())]
    ScheduleConflict(ConflictReport),
    #[error("applicant already has an open interview; confirm to proceed")]
    DuplicateApplicant(ConflictReport),
    #[error("no document of kind '{kind}' on this application")]
    UnknownDocument { kind: String },
    #[error("interview is {status} and can no longer be moved")]
    InterviewClosed { status: &'static str },
}
