use std::sync::Arc;

use agency_core::auth::AdminGate;
use agency_core::calendar::CalendarClient;
use agency_core::notify::{MailSettings, Mailer, TemplateRenderer};
use agency_core::store::Store;
use agency_core::workflow::{ContactWorkflow, MeetingWorkflow};
use chrono_tz::Tz;

use crate::uploads::UploadStore;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    store: Arc<dyn Store>,
    contact: ContactWorkflow,
    meeting: MeetingWorkflow,
    gate: AdminGate,
    uploads: UploadStore,
}

/// Everything the state is assembled from.
pub struct Collaborators<S> {
    pub store: Arc<S>,
    pub calendar: Arc<dyn CalendarClient>,
    pub mailer: Arc<dyn Mailer>,
    pub templates: Arc<TemplateRenderer>,
    pub mail: MailSettings,
    pub timezone: Tz,
    pub gate: AdminGate,
    pub uploads: UploadStore,
}

impl AppState {
    pub fn new<S: Store + 'static>(parts: Collaborators<S>) -> Self {
        let contact = ContactWorkflow::new(
            parts.store.clone(),
            parts.mailer.clone(),
            parts.templates.clone(),
            parts.mail.clone(),
        );
        let meeting = MeetingWorkflow::new(
            parts.store.clone(),
            parts.calendar,
            parts.mailer,
            parts.templates,
            parts.mail,
            parts.timezone,
        );

        Self {
            inner: Arc::new(InnerState {
                store: parts.store,
                contact,
                meeting,
                gate: parts.gate,
                uploads: parts.uploads,
            }),
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    pub fn contact(&self) -> &ContactWorkflow {
        &self.inner.contact
    }

    pub fn meeting(&self) -> &MeetingWorkflow {
        &self.inner.meeting
    }

    pub fn gate(&self) -> &AdminGate {
        &self.inner.gate
    }

    pub fn uploads(&self) -> &UploadStore {
        &self.inner.uploads
    }
}
