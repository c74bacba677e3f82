use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ApplicationId, ApplicationIntake, ApplicationStatus, DocumentRequirement, DocumentStatus,
    InterviewId, InterviewStatus, InvoiceId, LeadId, LeadIntake, LeadStatus, Payment,
    PaymentMethod,
};
use super::lifecycle::TransitionMode;
use super::repository::{
    ApplicationRepository, InterviewRepository, InvoiceRepository, LeadRepository,
    NotificationPublisher, RepositoryError,
};
use super::scheduling::SlotRequest;
use super::service::{AdmissionsService, AdmissionsServiceError};

/// Router builder exposing the admissions pipeline over HTTP.
pub fn admissions_router<L, A, I, V, N>(service: Arc<AdmissionsService<L, A, I, V, N>>) -> Router
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    Router::new()
        .route(
            "/api/v1/admissions/leads",
            post(register_lead_handler::<L, A, I, V, N>),
        )
        .route(
            "/api/v1/admissions/leads/:lead_id/status",
            post(move_lead_handler::<L, A, I, V, N>),
        )
        .route(
            "/api/v1/admissions/leads/:lead_id/convert",
            post(convert_lead_handler::<L, A, I, V, N>),
        )
        .route(
            "/api/v1/admissions/enquiries/import",
            post(import_enquiries_handler::<L, A, I, V, N>),
        )
        .route(
            "/api/v1/admissions/applications",
            post(submit_application_handler::<L, A, I, V, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id",
            get(application_status_handler::<L, A, I, V, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/status",
            post(transition_application_handler::<L, A, I, V, N>),
        )
        .route(
            "/api/v1/admissions/applications/:application_id/documents",
            post(update_document_handler::<L, A, I, V, N>),
        )
        .route(
            "/api/v1/admissions/interviews",
            post(schedule_interview_handler::<L, A, I, V, N>),
        )
        .route(
            "/api/v1/admissions/interviews/:interview_id",
            post(reschedule_interview_handler::<L, A, I, V, N>),
        )
        .route(
            "/api/v1/admissions/interviews/:interview_id/status",
            post(close_interview_handler::<L, A, I, V, N>),
        )
        .route(
            "/api/v1/admissions/invoices",
            post(issue_invoice_handler::<L, A, I, V, N>),
        )
        .route(
            "/api/v1/admissions/invoices/:invoice_id/payments",
            post(record_payment_handler::<L, A, I, V, N>),
        )
        .route(
            "/api/v1/admissions/invoices/:invoice_id/void",
            post(void_invoice_handler::<L, A, I, V, N>),
        )
        .route(
            "/api/v1/admissions/report",
            post(funnel_report_handler::<L, A, I, V, N>),
        )
        .with_state(service)
}

fn transition_mode(override_requested: bool) -> TransitionMode {
    if override_requested {
        TransitionMode::Override
    } else {
        TransitionMode::Standard
    }
}

fn error_response(error: AdmissionsServiceError) -> Response {
    match error {
        AdmissionsServiceError::Repository(RepositoryError::NotFound) => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "error": "record not found" })),
        )
            .into_response(),
        AdmissionsServiceError::Repository(RepositoryError::Conflict) => (
            StatusCode::CONFLICT,
            axum::Json(json!({ "error": "record already exists" })),
        )
            .into_response(),
        AdmissionsServiceError::ScheduleConflict(report) => {
            let messages: Vec<String> = report
                .conflicts
                .iter()
                .map(|conflict| conflict.message())
                .collect();
            let payload = json!({
                "error": "counselor is already booked in this slot",
                "conflicts": messages,
                "detail": report,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        AdmissionsServiceError::DuplicateApplicant(report) => {
            let messages: Vec<String> = report
                .warnings
                .iter()
                .map(|warning| warning.message())
                .collect();
            let payload = json!({
                "error": "applicant already has an open interview",
                "warnings": messages,
                "hint": "resubmit with acknowledge_warnings to proceed",
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        AdmissionsServiceError::Transition(error) => (
            StatusCode::CONFLICT,
            axum::Json(json!({ "error": error.to_string() })),
        )
            .into_response(),
        error @ AdmissionsServiceError::InterviewClosed { .. } => (
            StatusCode::CONFLICT,
            axum::Json(json!({ "error": error.to_string() })),
        )
            .into_response(),
        error @ (AdmissionsServiceError::Slot(_)
        | AdmissionsServiceError::Billing(_)
        | AdmissionsServiceError::Import(_)
        | AdmissionsServiceError::UnknownDocument { .. }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({ "error": error.to_string() })),
        )
            .into_response(),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({ "error": other.to_string() })),
        )
            .into_response(),
    }
}

fn today_or_local(today: Option<NaiveDate>) -> NaiveDate {
    today.unwrap_or_else(|| Local::now().date_naive())
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterLeadRequest {
    #[serde(flatten)]
    intake: LeadIntake,
    #[serde(default)]
    today: Option<NaiveDate>,
}

pub(crate) async fn register_lead_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    axum::Json(request): axum::Json<RegisterLeadRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.register_lead(request.intake, today_or_local(request.today)) {
        Ok(lead) => (StatusCode::CREATED, axum::Json(lead)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeadStatusRequest {
    status: LeadStatus,
    #[serde(default, rename = "override")]
    override_transition: bool,
}

pub(crate) async fn move_lead_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    Path(lead_id): Path<String>,
    axum::Json(request): axum::Json<LeadStatusRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let mode = transition_mode(request.override_transition);
    match service.move_lead(&LeadId(lead_id), request.status, mode) {
        Ok((lead, receipt)) => (
            StatusCode::OK,
            axum::Json(json!({ "lead": lead, "receipt": receipt })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConvertLeadRequest {
    #[serde(default)]
    documents: Vec<DocumentRequirement>,
}

pub(crate) async fn convert_lead_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    Path(lead_id): Path<String>,
    axum::Json(request): axum::Json<ConvertLeadRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.convert_lead(&LeadId(lead_id), request.documents) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImportEnquiriesRequest {
    csv: String,
    #[serde(default)]
    today: Option<NaiveDate>,
}

pub(crate) async fn import_enquiries_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    axum::Json(request): axum::Json<ImportEnquiriesRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let reader = std::io::Cursor::new(request.csv.into_bytes());
    match service.import_enquiries(reader, today_or_local(request.today)) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_application_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    axum::Json(intake): axum::Json<ApplicationIntake>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.submit_application(intake) {
        Ok(record) => (StatusCode::ACCEPTED, axum::Json(record.status_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn application_status_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    Path(application_id): Path<String>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.application_status(&ApplicationId(application_id)) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplicationStatusRequest {
    status: ApplicationStatus,
    #[serde(default, rename = "override")]
    override_transition: bool,
}

pub(crate) async fn transition_application_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<ApplicationStatusRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let mode = transition_mode(request.override_transition);
    match service.transition_application(&ApplicationId(application_id), request.status, mode) {
        Ok((record, receipt)) => (
            StatusCode::OK,
            axum::Json(json!({
                "application": record.status_view(),
                "receipt": receipt,
            })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentStatusRequest {
    kind: String,
    status: DocumentStatus,
    #[serde(default, rename = "override")]
    override_transition: bool,
}

pub(crate) async fn update_document_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<DocumentStatusRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let mode = transition_mode(request.override_transition);
    match service.update_document(
        &ApplicationId(application_id),
        &request.kind,
        request.status,
        mode,
    ) {
        Ok((record, receipt)) => (
            StatusCode::OK,
            axum::Json(json!({
                "application": record.status_view(),
                "receipt": receipt,
            })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleInterviewRequest {
    #[serde(flatten)]
    slot: SlotRequest,
    #[serde(default)]
    acknowledge_warnings: bool,
}

pub(crate) async fn schedule_interview_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    axum::Json(request): axum::Json<ScheduleInterviewRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.schedule_interview(request.slot, request.acknowledge_warnings) {
        Ok(interview) => (StatusCode::CREATED, axum::Json(interview)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reschedule_interview_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    Path(interview_id): Path<String>,
    axum::Json(request): axum::Json<ScheduleInterviewRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.reschedule_interview(
        &InterviewId(interview_id),
        request.slot,
        request.acknowledge_warnings,
    ) {
        Ok(interview) => (StatusCode::OK, axum::Json(interview)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct InterviewStatusRequest {
    status: InterviewStatus,
    #[serde(default, rename = "override")]
    override_transition: bool,
}

pub(crate) async fn close_interview_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    Path(interview_id): Path<String>,
    axum::Json(request): axum::Json<InterviewStatusRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let mode = transition_mode(request.override_transition);
    match service.close_interview(&InterviewId(interview_id), request.status, mode) {
        Ok((interview, receipt)) => (
            StatusCode::OK,
            axum::Json(json!({ "interview": interview, "receipt": receipt })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueInvoiceRequest {
    application_id: ApplicationId,
    amount: u32,
    #[serde(default)]
    discount: u32,
    due_date: NaiveDate,
    #[serde(default)]
    today: Option<NaiveDate>,
}

pub(crate) async fn issue_invoice_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    axum::Json(request): axum::Json<IssueInvoiceRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.issue_invoice(
        request.application_id,
        request.amount,
        request.discount,
        request.due_date,
        today_or_local(request.today),
    ) {
        Ok(invoice) => (StatusCode::CREATED, axum::Json(invoice)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecordPaymentRequest {
    amount: u32,
    method: PaymentMethod,
    #[serde(default)]
    received_on: Option<NaiveDate>,
}

pub(crate) async fn record_payment_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    Path(invoice_id): Path<String>,
    axum::Json(request): axum::Json<RecordPaymentRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    let received_on = today_or_local(request.received_on);
    let payment = Payment {
        amount: request.amount,
        method: request.method,
        received_on,
    };
    match service.record_payment(&InvoiceId(invoice_id), payment, received_on) {
        Ok(invoice) => (StatusCode::OK, axum::Json(invoice)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn void_invoice_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    Path(invoice_id): Path<String>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.void_invoice(&InvoiceId(invoice_id)) {
        Ok(invoice) => (StatusCode::OK, axum::Json(invoice)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FunnelReportRequest {
    #[serde(default)]
    today: Option<NaiveDate>,
}

pub(crate) async fn funnel_report_handler<L, A, I, V, N>(
    State(service): State<Arc<AdmissionsService<L, A, I, V, N>>>,
    axum::Json(request): axum::Json<FunnelReportRequest>,
) -> Response
where
    L: LeadRepository + 'static,
    A: ApplicationRepository + 'static,
    I: InterviewRepository + 'static,
    V: InvoiceRepository + 'static,
    N: NotificationPublisher + 'static,
{
    match service.funnel_report(today_or_local(request.today)) {
        Ok(report) => (StatusCode::OK, axum::Json(report.summary())).into_response(),
        Err(error) => error_response(error),
    }
}
