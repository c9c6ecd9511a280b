use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;

/// The four notification templates. Names end in `.html` so that every
/// interpolated value is HTML-escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTemplate {
    ContactAdmin,
    ContactUser,
    MeetingAttendee,
    MeetingAdmin,
}

impl EmailTemplate {
    pub const ALL: [EmailTemplate; 4] = [
        EmailTemplate::ContactAdmin,
        EmailTemplate::ContactUser,
        EmailTemplate::MeetingAttendee,
        EmailTemplate::MeetingAdmin,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EmailTemplate::ContactAdmin => "contact-admin.html",
            EmailTemplate::ContactUser => "contact-user.html",
            EmailTemplate::MeetingAttendee => "meeting-attendee.html",
            EmailTemplate::MeetingAdmin => "meeting-admin.html",
        }
    }

    fn source(self) -> &'static str {
        match self {
            EmailTemplate::ContactAdmin => include_str!("../../templates/contact-admin.html"),
            EmailTemplate::ContactUser => include_str!("../../templates/contact-user.html"),
            EmailTemplate::MeetingAttendee => {
                include_str!("../../templates/meeting-attendee.html")
            }
            EmailTemplate::MeetingAdmin => include_str!("../../templates/meeting-admin.html"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template {name} failed: {source}")]
    Render {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },
}

/// Compiled notification templates, built once at start-up.
#[derive(Debug)]
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        for template in EmailTemplate::ALL {
            env.add_template(template.name(), template.source())
                .map_err(|source| TemplateError::Render {
                    name: template.name(),
                    source,
                })?;
        }
        Ok(Self { env })
    }

    pub fn render<C: Serialize>(
        &self,
        template: EmailTemplate,
        context: &C,
    ) -> Result<String, TemplateError> {
        let wrap = |source| TemplateError::Render {
            name: template.name(),
            source,
        };
        self.env
            .get_template(template.name())
            .map_err(wrap)?
            .render(context)
            .map_err(wrap)
    }
}

/// Placeholders for [`EmailTemplate::ContactAdmin`] and
/// [`EmailTemplate::ContactUser`].
#[derive(Debug, Serialize)]
pub struct ContactContext<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

/// Placeholders for the meeting templates. `attendee_email` and `event_id`
/// are only shown on the operator copy.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingContext<'a> {
    pub topic: &'a str,
    pub start_date_time: &'a str,
    pub duration: u32,
    pub meeting_link: Option<&'a str>,
    pub attendee_email: &'a str,
    pub event_id: &'a str,
}
