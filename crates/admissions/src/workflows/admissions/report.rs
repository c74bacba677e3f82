use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::billing;
use super::domain::{
    ApplicationStatus, CounselorId, DocumentStatus, Interview, InterviewId, InterviewStatus,
    Invoice, InvoiceStatus, Lead, LeadStatus, TimeOfDay,
};
use super::repository::ApplicationRecord;

/// Mandatory-document progress across all open applications.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentCompletion {
    pub mandatory_total: usize,
    pub mandatory_verified: usize,
    pub awaiting_review: usize,
}

/// Fee position across all non-void invoices.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct BillingTotals {
    pub billed: u64,
    pub collected: u64,
    pub outstanding: u64,
    pub overdue_invoices: usize,
}

/// Pipeline snapshot backing the admissions dashboard.
#[derive(Debug, Default)]
pub struct FunnelReport {
    pub lead_counts: HashMap<LeadStatus, usize>,
    pub application_counts: HashMap<ApplicationStatus, usize>,
    pub documents: DocumentCompletion,
    pub upcoming_interviews: Vec<InterviewSnapshot>,
    pub billing: BillingTotals,
}

#[derive(Debug, Clone)]
pub struct InterviewSnapshot {
    pub id: InterviewId,
    pub applicant_name: String,
    pub counselor_id: CounselorId,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl InterviewSnapshot {
    fn from_interview(interview: &Interview) -> Self {
        Self {
            id: interview.id.clone(),
            applicant_name: interview.applicant_name.clone(),
            counselor_id: interview.counselor_id.clone(),
            date: interview.date,
            start: interview.start,
            end: interview.end,
        }
    }

    pub fn to_view(&self) -> InterviewSnapshotView {
        InterviewSnapshotView {
            id: self.id.clone(),
            applicant_name: self.applicant_name.clone(),
            counselor_id: self.counselor_id.clone(),
            date: self.date,
            start: self.start,
            end: self.end,
        }
    }
}

impl FunnelReport {
    pub fn build(
        leads: &[Lead],
        applications: &[ApplicationRecord],
        interviews: &[Interview],
        invoices: &[Invoice],
        today: NaiveDate,
    ) -> Self {
        let mut report = FunnelReport::default();

        for lead in leads {
            *report.lead_counts.entry(lead.status).or_default() += 1;
        }

        for record in applications {
            *report.application_counts.entry(record.status).or_default() += 1;
            for document in &record.application.documents {
                if document.mandatory {
                    report.documents.mandatory_total += 1;
                    if document.status == DocumentStatus::Verified {
                        report.documents.mandatory_verified += 1;
                    }
                }
                if document.status == DocumentStatus::Uploaded {
                    report.documents.awaiting_review += 1;
                }
            }
        }

        for interview in interviews {
            if interview.status == InterviewStatus::Scheduled && interview.date >= today {
                report
                    .upcoming_interviews
                    .push(InterviewSnapshot::from_interview(interview));
            }
        }
        report
            .upcoming_interviews
            .sort_by(|a, b| (a.date, a.start).cmp(&(b.date, b.start)));

        for invoice in invoices {
            if invoice.status == InvoiceStatus::Void {
                continue;
            }
            report.billing.billed += u64::from(invoice.final_amount());
            report.billing.collected += u64::from(invoice.paid_amount);
            if billing::derive_status(invoice, today) == InvoiceStatus::Overdue {
                report.billing.overdue_invoices += 1;
            }
        }
        report.billing.outstanding = report
            .billing
            .billed
            .saturating_sub(report.billing.collected);

        report
    }

    pub fn summary(&self) -> FunnelSummary {
        let lead_counts = LeadStatus::ordered()
            .into_iter()
            .filter_map(|status| {
                self.lead_counts.get(&status).map(|count| StatusCountEntry {
                    status_label: status.label(),
                    count: *count,
                })
            })
            .collect();

        let application_counts = ApplicationStatus::ordered()
            .into_iter()
            .filter_map(|status| {
                self.application_counts
                    .get(&status)
                    .map(|count| StatusCountEntry {
                        status_label: status.label(),
                        count: *count,
                    })
            })
            .collect();

        FunnelSummary {
            lead_counts,
            application_counts,
            documents: self.documents.clone(),
            upcoming_interviews: self
                .upcoming_interviews
                .iter()
                .map(InterviewSnapshot::to_view)
                .collect(),
            billing: self.billing.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusCountEntry {
    pub status_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewSnapshotView {
    pub id: InterviewId,
    pub applicant_name: String,
    pub counselor_id: CounselorId,
    pub date: NaiveDate,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunnelSummary {
    pub lead_counts: Vec<StatusCountEntry>,
    pub application_counts: Vec<StatusCountEntry>,
    pub documents: DocumentCompletion,
    pub upcoming_interviews: Vec<InterviewSnapshotView>,
    pub billing: BillingTotals,
}
