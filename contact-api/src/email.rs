use crate::submission::ValidatedSubmission;
use lettre::message::Mailbox;
use serde::Serialize;
use tinytemplate::TinyTemplate;

pub use tinytemplate::error::Error as FormatError;

const CONTACT_EMAIL_TEMPLATE_NAME: &str = "contact-email-template";
const CONTACT_EMAIL_TEMPLATE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/contact-email.html"
));

/// An email ready to be handed to a [`crate::mailer::Mailer`].
///
/// The transport adds `MIME-Version: 1.0` and `Content-Type: text/html; charset=utf-8` when it
/// builds the wire message.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedEmail {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub html_body: String,
}

#[derive(Serialize)]
struct Context<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
}

/// Renders the submission into an email which the operator sends to themselves.
///
/// The sender's address only appears in the body. Every sender-supplied value is HTML-escaped.
pub fn compose(
    submission: &ValidatedSubmission,
    operator: &Mailbox,
) -> Result<ComposedEmail, FormatError> {
    let subject = effective_subject(submission);
    let mut tt = TinyTemplate::new();
    tt.add_template(CONTACT_EMAIL_TEMPLATE_NAME, CONTACT_EMAIL_TEMPLATE)?;
    let context = Context {
        name: &submission.name,
        email: &submission.email,
        subject: &subject,
        message: &submission.message,
    };
    let html_body = tt.render(CONTACT_EMAIL_TEMPLATE_NAME, &context)?;
    Ok(ComposedEmail {
        from: operator.clone(),
        to: operator.clone(),
        subject,
        html_body,
    })
}

fn effective_subject(submission: &ValidatedSubmission) -> String {
    match submission.subject.as_deref() {
        Some(subject) => subject.into(),
        None => format!("Portfolio Contact from {}", submission.name),
    }
}
