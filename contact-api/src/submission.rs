use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use thiserror::Error;

const MIN_NAME_LENGTH: usize = 3;
const MIN_MESSAGE_LENGTH: usize = 10;
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$";

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

/// A contact form submission as decoded from the request body.
///
/// Absent and `null` fields decode to `None` and are treated like empty strings.
#[derive(Deserialize, Debug, Default)]
pub struct ContactFormMessage {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl ContactFormMessage {
    /// Trims all fields and checks them in order, reporting only the first failing rule.
    pub fn validate(self) -> Result<ValidatedSubmission, ValidationError> {
        let name = trimmed(self.name);
        let email = trimmed(self.email);
        let subject = trimmed(self.subject);
        let message = trimmed(self.message);

        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if email.is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if message.is_empty() {
            return Err(ValidationError::MissingField("message"));
        }
        if name.chars().count() < MIN_NAME_LENGTH {
            return Err(ValidationError::TooShort {
                field: "name",
                min: MIN_NAME_LENGTH,
            });
        }
        if !email_regex().is_match(&email) {
            return Err(ValidationError::InvalidFormat("email"));
        }
        if message.chars().count() < MIN_MESSAGE_LENGTH {
            return Err(ValidationError::TooShort {
                field: "message",
                min: MIN_MESSAGE_LENGTH,
            });
        }

        Ok(ValidatedSubmission {
            name,
            email,
            subject: (!subject.is_empty()).then_some(subject),
            message,
        })
    }
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).unwrap())
}

/// A submission which passed every validation rule. All fields are trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSubmission {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("invalid {0} format")]
    InvalidFormat(&'static str),
}

#[cfg(test)]
mod tests {
    use super::{ContactFormMessage, ValidatedSubmission, ValidationError};
    use googletest::prelude::*;

    #[test]
    fn accepts_valid_submission_and_trims_fields() -> Result<()> {
        let message = Message::arbitrary()
            .with_name("  Jane Doe \n")
            .with_email("\tjane@example.com ")
            .with_subject("  Hello  ")
            .with_message("  Hello there, this is a test.  ")
            .build();

        verify_that!(
            message.validate(),
            ok(eq(ValidatedSubmission {
                name: "Jane Doe".into(),
                email: "jane@example.com".into(),
                subject: Some("Hello".into()),
                message: "Hello there, this is a test.".into(),
            }))
        )
    }

    #[test]
    fn treats_blank_subject_as_absent() -> Result<()> {
        let message = Message::arbitrary().with_subject("   ").build();

        verify_that!(
            message.validate(),
            ok(field!(ValidatedSubmission.subject, none()))
        )
    }

    #[test]
    fn accepts_missing_subject() -> Result<()> {
        let message = ContactFormMessage {
            subject: None,
            ..Message::arbitrary().build()
        };

        verify_that!(
            message.validate(),
            ok(field!(ValidatedSubmission.subject, none()))
        )
    }

    #[test]
    fn rejects_missing_name() -> Result<()> {
        let message = ContactFormMessage {
            name: None,
            ..Message::arbitrary().build()
        };

        verify_that!(
            message.validate(),
            err(eq(ValidationError::MissingField("name")))
        )
    }

    #[test]
    fn rejects_whitespace_only_name() -> Result<()> {
        let message = Message::arbitrary().with_name("   ").build();

        verify_that!(
            message.validate(),
            err(eq(ValidationError::MissingField("name")))
        )
    }

    #[test]
    fn rejects_missing_email() -> Result<()> {
        let message = Message::arbitrary().with_email(" ").build();

        verify_that!(
            message.validate(),
            err(eq(ValidationError::MissingField("email")))
        )
    }

    #[test]
    fn rejects_missing_message() -> Result<()> {
        let message = Message::arbitrary().with_message("\n\n").build();

        verify_that!(
            message.validate(),
            err(eq(ValidationError::MissingField("message")))
        )
    }

    #[test]
    fn reports_first_failing_rule_only() -> Result<()> {
        let message = ContactFormMessage::default();

        verify_that!(
            message.validate(),
            err(eq(ValidationError::MissingField("name")))
        )
    }

    #[test]
    fn rejects_name_shorter_than_three_characters() -> Result<()> {
        let message = Message::arbitrary().with_name(" Jo ").build();

        verify_that!(
            message.validate(),
            err(eq(ValidationError::TooShort {
                field: "name",
                min: 3
            }))
        )
    }

    #[test]
    fn accepts_name_of_exactly_three_characters() -> Result<()> {
        let message = Message::arbitrary().with_name("Ann").build();

        verify_that!(message.validate(), ok(anything()))
    }

    #[test]
    fn counts_name_length_in_characters() -> Result<()> {
        let message = Message::arbitrary().with_name("Zé").build();

        verify_that!(
            message.validate(),
            err(eq(ValidationError::TooShort {
                field: "name",
                min: 3
            }))
        )
    }

    #[test]
    fn accepts_short_email_with_two_letter_top_level_domain() -> Result<()> {
        let message = Message::arbitrary().with_email("a@b.co").build();

        verify_that!(message.validate(), ok(anything()))
    }

    #[test]
    fn rejects_email_without_at_sign() -> Result<()> {
        let message = Message::arbitrary().with_email("noatsign.com").build();

        verify_that!(
            message.validate(),
            err(eq(ValidationError::InvalidFormat("email")))
        )
    }

    #[test]
    fn rejects_email_without_top_level_domain() -> Result<()> {
        let message = Message::arbitrary().with_email("a@b").build();

        verify_that!(
            message.validate(),
            err(eq(ValidationError::InvalidFormat("email")))
        )
    }

    #[test]
    fn rejects_email_with_double_at_sign() -> Result<()> {
        let message = Message::arbitrary().with_email("a@@b.com").build();

        verify_that!(
            message.validate(),
            err(eq(ValidationError::InvalidFormat("email")))
        )
    }

    #[test]
    fn rejects_email_with_numeric_top_level_domain() -> Result<()> {
        let message = Message::arbitrary().with_email("a@b.c1").build();

        verify_that!(
            message.validate(),
            err(eq(ValidationError::InvalidFormat("email")))
        )
    }

    #[test]
    fn rejects_message_shorter_than_ten_characters() -> Result<()> {
        let message = Message::arbitrary().with_message("  Too short ").build();

        verify_that!(
            message.validate(),
            err(eq(ValidationError::TooShort {
                field: "message",
                min: 10
            }))
        )
    }

    #[test]
    fn accepts_message_of_exactly_ten_characters() -> Result<()> {
        let message = Message::arbitrary().with_message("0123456789").build();

        verify_that!(message.validate(), ok(anything()))
    }

    #[test]
    fn renders_human_readable_messages() -> Result<()> {
        verify_that!(
            vec![
                ValidationError::MissingField("email").to_string(),
                ValidationError::TooShort {
                    field: "name",
                    min: 3
                }
                .to_string(),
                ValidationError::InvalidFormat("email").to_string(),
            ],
            elements_are![
                eq("email is required"),
                eq("name must be at least 3 characters"),
                eq("invalid email format"),
            ]
        )
    }

    struct Message(ContactFormMessage);

    impl Message {
        fn arbitrary() -> Self {
            Self(ContactFormMessage {
                name: Some("Arbitrary sender".into()),
                email: Some("email@example.com".into()),
                subject: Some("Test".into()),
                message: Some("Test message body".into()),
            })
        }

        fn with_name(self, name: impl AsRef<str>) -> Self {
            Self(ContactFormMessage {
                name: Some(name.as_ref().into()),
                ..self.0
            })
        }

        fn with_email(self, email: impl AsRef<str>) -> Self {
            Self(ContactFormMessage {
                email: Some(email.as_ref().into()),
                ..self.0
            })
        }

        fn with_subject(self, subject: impl AsRef<str>) -> Self {
            Self(ContactFormMessage {
                subject: Some(subject.as_ref().into()),
                ..self.0
            })
        }

        fn with_message(self, message: impl AsRef<str>) -> Self {
            Self(ContactFormMessage {
                message: Some(message.as_ref().into()),
                ..self.0
            })
        }

        fn build(self) -> ContactFormMessage {
            self.0
        }
    }
}
