use std::sync::Arc;

use super::{send_pair, WorkflowError};
use crate::model::{ContactMessage, NewContactMessage};
use crate::notify::templates::ContactContext;
use crate::notify::{EmailMessage, EmailTemplate, MailSettings, Mailer, TemplateRenderer};
use crate::saga::{Saga, SagaError, Step};
use crate::store::ContactStore;

const PERSIST: Step = Step::uncompensated("persist_contact", "contact message stays stored");
const RENDER: Step = Step::pure("render_emails");
const NOTIFY: Step = Step::uncompensated("send_emails", "a delivered email is not recalled");

/// Display name on the acknowledgement sent back to the visitor.
const AGENCY_NAME: &str = "Digital Agency";

/// Store a contact message, then notify the operator and thank the sender.
pub struct ContactWorkflow {
    store: Arc<dyn ContactStore>,
    mailer: Arc<dyn Mailer>,
    templates: Arc<TemplateRenderer>,
    mail: MailSettings,
}

impl ContactWorkflow {
    pub fn new(
        store: Arc<dyn ContactStore>,
        mailer: Arc<dyn Mailer>,
        templates: Arc<TemplateRenderer>,
        mail: MailSettings,
    ) -> Self {
        Self {
            store,
            mailer,
            templates,
            mail,
        }
    }

    pub async fn submit(
        &self,
        submission: NewContactMessage,
    ) -> Result<ContactMessage, SagaError<WorkflowError>> {
        let mut saga = Saga::new("contact");

        let contact = saga
            .run(PERSIST, async {
                self.store
                    .insert_contact(&submission)
                    .await
                    .map_err(WorkflowError::from)
            })
            .await?;

        let (to_operator, to_sender) = saga
            .run(RENDER, async { self.compose(&contact) })
            .await?;

        saga.run(NOTIFY, async {
            send_pair(self.mailer.as_ref(), &to_operator, &to_sender)
                .await
                .map_err(WorkflowError::from)
        })
        .await?;

        tracing::info!(contact_id = %contact.id, "contact message processed");
        Ok(contact)
    }

    fn compose(&self, contact: &ContactMessage) -> Result<(EmailMessage, EmailMessage), WorkflowError> {
        let ctx = ContactContext {
            name: &contact.name,
            email: &contact.email,
            message: &contact.message,
        };

        let to_operator = EmailMessage {
            from_name: None,
            from_address: self.mail.sender_address.clone(),
            to: self.mail.operator_address.clone(),
            subject: format!("New Contact Form Submission from {}", contact.name),
            html: self.templates.render(EmailTemplate::ContactAdmin, &ctx)?,
        };
        let to_sender = EmailMessage {
            from_name: Some(AGENCY_NAME.to_string()),
            from_address: self.mail.sender_address.clone(),
            to: contact.email.clone(),
            subject: "Thank you for contacting us".to_string(),
            html: self.templates.render(EmailTemplate::ContactUser, &ctx)?,
        };
        Ok((to_operator, to_sender))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::RecordingMailer;

    fn settings() -> MailSettings {
        MailSettings {
            sender_address: "relay@agency.test".into(),
            operator_address: "owner@agency.test".into(),
        }
    }

    fn submission() -> NewContactMessage {
        NewContactMessage {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            message: "Can you help with PPC?".into(),
        }
    }

    fn workflow(store: Arc<MemoryStore>, mailer: Arc<RecordingMailer>) -> ContactWorkflow {
        ContactWorkflow::new(
            store,
            mailer,
            Arc::new(TemplateRenderer::new().unwrap()),
            settings(),
        )
    }

    #[tokio::test]
    async fn persists_once_and_sends_two_emails() {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::new());

        workflow(store.clone(), mailer.clone())
            .submit(submission())
            .await
            .unwrap();

        assert_eq!(store.contacts().await.len(), 1);
        let sent = mailer.sent();
        assert_eq!(sent.len(), 2);

        let operator = sent.iter().find(|m| m.to == "owner@agency.test").unwrap();
        assert_eq!(operator.subject, "New Contact Form Submission from Ada");
        assert!(operator.html.contains("Can you help with PPC?"));

        let sender = sent.iter().find(|m| m.to == "ada@example.com").unwrap();
        assert_eq!(sender.subject, "Thank you for contacting us");
        assert_eq!(sender.from_name.as_deref(), Some("Digital Agency"));
    }

    #[tokio::test]
    async fn mail_failure_keeps_the_stored_message() {
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::failing_for("ada@example.com"));

        let err = workflow(store.clone(), mailer)
            .submit(submission())
            .await
            .unwrap_err();

        assert_eq!(err.step, "send_emails");
        assert_eq!(err.left_behind, vec!["persist_contact"]);
        assert!(matches!(err.source, WorkflowError::Mail(_)));
        assert_eq!(store.contacts().await.len(), 1);
    }
}
