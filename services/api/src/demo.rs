use std::io::Cursor;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Args;

use admissions::config::AppConfig;
use admissions::error::AppError;
use admissions::workflows::admissions::scheduling::SlotRequest;
use admissions::workflows::admissions::{
    AdmissionsService, ApplicationIntake, ApplicationStatus, CounselorId, DocumentRequirement,
    DocumentStatus, FunnelSummary, InterviewMode, LeadStatus, Payment, PaymentMethod, TimeOfDay,
    TimeParseError, TransitionMode,
};

use crate::infra::{
    InMemoryApplicationRepository, InMemoryInterviewRepository, InMemoryInvoiceRepository,
    InMemoryLeadRepository, InMemoryNoticePublisher,
};

#[derive(Args, Debug, Default)]
pub(crate) struct FunnelReportArgs {
    /// Reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Skip the billing portion of the demo.
    #[arg(long)]
    pub(crate) skip_billing: bool,
}

type DemoService = AdmissionsService<
    InMemoryLeadRepository,
    InMemoryApplicationRepository,
    InMemoryInterviewRepository,
    InMemoryInvoiceRepository,
    InMemoryNoticePublisher,
>;

fn build_demo_service() -> Result<(DemoService, Arc<InMemoryNoticePublisher>), AppError> {
    let config = AppConfig::load()?;
    let notices = Arc::new(InMemoryNoticePublisher::default());
    let service = AdmissionsService::new(
        Arc::new(InMemoryLeadRepository::default()),
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(InMemoryInterviewRepository::default()),
        Arc::new(InMemoryInvoiceRepository::default()),
        notices.clone(),
        config.admissions.eligibility_policy()?,
    );
    Ok((service, notices))
}

const SAMPLE_ENQUIRIES: &str = "\
Student Name,Parent Name,Contact,Class,Enquiry Date,Source,Date of Birth
Aarav Mehta,Rohit Mehta,9876500001,Class 1,2025-06-14,Walk In,2019-05-15
Diya Sharma,Anita Sharma,9876500002,Class 2,2025-06-15,Website,
Kabir Rao,Sunil Rao,9876500003,Class 1,2025-06-16,Referral,2020-11-05
Meera Nair,Latha Nair,9876500004,Class 3,2025-06-17,Phone,
";

fn demo_time(value: &str) -> Result<TimeOfDay, String> {
    value
        .parse()
        .map_err(|err: TimeParseError| err.to_string())
}

fn seed_pipeline(service: &DemoService, today: NaiveDate) -> Result<(), String> {
    let summary = service
        .import_enquiries(Cursor::new(SAMPLE_ENQUIRIES), today)
        .map_err(|err| err.to_string())?;
    println!(
        "Imported {} enquiries ({} skipped)",
        summary.imported.len(),
        summary.skipped
    );

    // Work the first lead across the board and into an application.
    let lead_id = summary.imported[0].clone();
    for status in [LeadStatus::Contacted, LeadStatus::Qualified] {
        service
            .move_lead(&lead_id, status, TransitionMode::Standard)
            .map_err(|err| err.to_string())?;
    }
    let record = service
        .convert_lead(
            &lead_id,
            vec![
                DocumentRequirement {
                    kind: "Birth Certificate".to_string(),
                    mandatory: true,
                },
                DocumentRequirement {
                    kind: "Photograph".to_string(),
                    mandatory: false,
                },
            ],
        )
        .map_err(|err| err.to_string())?;
    let application_id = record.application.id.clone();

    for status in [
        ApplicationStatus::Submitted,
        ApplicationStatus::UnderReview,
        ApplicationStatus::Interview,
    ] {
        service
            .transition_application(&application_id, status, TransitionMode::Standard)
            .map_err(|err| err.to_string())?;
    }

    let interview = service
        .schedule_interview(
            SlotRequest {
                applicant_name: "Aarav Mehta".to_string(),
                counselor_id: CounselorId("c1".to_string()),
                date: today + chrono::Duration::days(5),
                start: demo_time("10:00")?,
                end: demo_time("10:30")?,
                mode: InterviewMode::InPerson,
                location: "Counseling Room 2".to_string(),
            },
            false,
        )
        .map_err(|err| err.to_string())?;
    println!(
        "Booked interview {} with {} on {}",
        interview.id.0, interview.counselor_id.0, interview.date
    );

    // A double-booking attempt is rejected with the busy window.
    let clash = service.schedule_interview(
        SlotRequest {
            applicant_name: "Diya Sharma".to_string(),
            counselor_id: CounselorId("c1".to_string()),
            date: interview.date,
            start: demo_time("10:15")?,
            end: demo_time("10:45")?,
            mode: InterviewMode::Online,
            location: String::new(),
        },
        false,
    );
    match clash {
        Err(err) => println!("Double-booking rejected: {err}"),
        Ok(_) => println!("warning: expected the clashing slot to be rejected"),
    }

    // The offer guard holds until the mandatory document is verified.
    match service.transition_application(
        &application_id,
        ApplicationStatus::OfferSent,
        TransitionMode::Standard,
    ) {
        Err(err) => println!("Offer held back: {err}"),
        Ok(_) => println!("warning: expected the offer to be blocked"),
    }
    for status in [DocumentStatus::Uploaded, DocumentStatus::Verified] {
        service
            .update_document(
                &application_id,
                "Birth Certificate",
                status,
                TransitionMode::Standard,
            )
            .map_err(|err| err.to_string())?;
    }
    service
        .transition_application(
            &application_id,
            ApplicationStatus::OfferSent,
            TransitionMode::Standard,
        )
        .map_err(|err| err.to_string())?;
    println!("Offer sent for {}", application_id.0);

    Ok(())
}

fn run_billing(service: &DemoService, today: NaiveDate) -> Result<(), String> {
    let record = service
        .submit_application(ApplicationIntake {
            applicant_name: "Diya Sharma".to_string(),
            date_of_birth: None,
            target_class: "Class 2".to_string(),
            documents: Vec::new(),
        })
        .map_err(|err| err.to_string())?;

    let invoice = service
        .issue_invoice(
            record.application.id.clone(),
            55000,
            5000,
            today + chrono::Duration::days(25),
            today,
        )
        .map_err(|err| err.to_string())?;
    println!(
        "Invoice {} issued: final amount {}",
        invoice.id.0,
        invoice.final_amount()
    );

    let invoice = service
        .record_payment(
            &invoice.id,
            Payment {
                amount: 20000,
                method: PaymentMethod::Cash,
                received_on: today,
            },
            today,
        )
        .map_err(|err| err.to_string())?;
    println!(
        "After first installment: {} (balance {})",
        invoice.status.label(),
        invoice.balance()
    );

    let invoice = service
        .record_payment(
            &invoice.id,
            Payment {
                amount: 30000,
                method: PaymentMethod::BankTransfer,
                received_on: today,
            },
            today,
        )
        .map_err(|err| err.to_string())?;
    println!(
        "After second installment: {} (balance {})",
        invoice.status.label(),
        invoice.balance()
    );

    Ok(())
}

fn render_funnel(summary: &FunnelSummary) {
    println!("\nLead board");
    for entry in &summary.lead_counts {
        println!("  {:<20} {}", entry.status_label, entry.count);
    }

    println!("Applications");
    for entry in &summary.application_counts {
        println!("  {:<20} {}", entry.status_label, entry.count);
    }

    println!(
        "Documents: {}/{} mandatory verified, {} awaiting review",
        summary.documents.mandatory_verified,
        summary.documents.mandatory_total,
        summary.documents.awaiting_review
    );

    println!("Upcoming interviews");
    for interview in &summary.upcoming_interviews {
        println!(
            "  {} with {} on {} {}-{}",
            interview.applicant_name,
            interview.counselor_id.0,
            interview.date,
            interview.start,
            interview.end
        );
    }

    println!(
        "Billing: billed {}, collected {}, outstanding {}, {} overdue",
        summary.billing.billed,
        summary.billing.collected,
        summary.billing.outstanding,
        summary.billing.overdue_invoices
    );
}

pub(crate) fn run_funnel_report(args: FunnelReportArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let (service, _notices) = build_demo_service()?;

    seed_pipeline(&service, today).map_err(demo_failure)?;
    let report = service
        .funnel_report(today)
        .map_err(|err| demo_failure(err.to_string()))?;
    render_funnel(&report.summary());
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let (service, notices) = build_demo_service()?;

    println!("School admissions demo ({today})");
    seed_pipeline(&service, today).map_err(demo_failure)?;

    if !args.skip_billing {
        run_billing(&service, today).map_err(demo_failure)?;
    }

    let report = service
        .funnel_report(today)
        .map_err(|err| demo_failure(err.to_string()))?;
    render_funnel(&report.summary());

    let events = notices.events();
    if !events.is_empty() {
        println!("\nNotices published");
        for notice in events {
            println!("  {} for {}", notice.template, notice.entity_id);
        }
    }

    Ok(())
}

fn demo_failure(message: impl Into<String>) -> AppError {
    AppError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        message.into(),
    ))
}
