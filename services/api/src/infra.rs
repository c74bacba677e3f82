use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use admissions::workflows::admissions::{
    AdmissionsNotice, AdmissionsService, ApplicationId, ApplicationRecord, ApplicationRepository,
    EligibilityPolicy, Interview, InterviewId, InterviewRepository, Invoice, InvoiceId,
    InvoiceRepository, Lead, LeadId, LeadRepository, NotificationPublisher, NoticeError,
    RepositoryError,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type SharedAdmissionsService = AdmissionsService<
    InMemoryLeadRepository,
    InMemoryApplicationRepository,
    InMemoryInterviewRepository,
    InMemoryInvoiceRepository,
    InMemoryNoticePublisher,
>;

pub(crate) fn build_admissions_service(policy: EligibilityPolicy) -> Arc<SharedAdmissionsService> {
    Arc::new(AdmissionsService::new(
        Arc::new(InMemoryLeadRepository::default()),
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(InMemoryInterviewRepository::default()),
        Arc::new(InMemoryInvoiceRepository::default()),
        Arc::new(InMemoryNoticePublisher::default()),
        policy,
    ))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLeadRepository {
    records: Arc<Mutex<HashMap<LeadId, Lead>>>,
}

impl LeadRepository for InMemoryLeadRepository {
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
        if guard.contains_key(&lead.id) {
            guard.insert(lead.id.clone(), lead);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
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
        if guard.contains_key(&record.application.id) {
            guard.insert(record.application.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
pub(crate) struct InMemoryInterviewRepository {
    records: Arc<Mutex<HashMap<InterviewId, Interview>>>,
}

impl InterviewRepository for InMemoryInterviewRepository {
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
        if guard.contains_key(&interview.id) {
            guard.insert(interview.id.clone(), interview);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
pub(crate) struct InMemoryInvoiceRepository {
    records: Arc<Mutex<HashMap<InvoiceId, Invoice>>>,
}

impl InvoiceRepository for InMemoryInvoiceRepository {
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
        if guard.contains_key(&invoice.id) {
            guard.insert(invoice.id.clone(), invoice);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
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
pub(crate) struct InMemoryNoticePublisher {
    events: Arc<Mutex<Vec<AdmissionsNotice>>>,
}

impl NotificationPublisher for InMemoryNoticePublisher {
    fn publish(&self, notice: AdmissionsNotice) -> Result<(), NoticeError> {
        let mut guard = self.events.lock().expect("notice mutex poisoned");
        guard.push(notice);
        Ok(())
    }
}

impl InMemoryNoticePublisher {
    pub(crate) fn events(&self) -> Vec<AdmissionsNotice> {
        self.events.lock().expect("notice mutex poisoned").clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
