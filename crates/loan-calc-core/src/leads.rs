use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FieldError;
use crate::gate::{KeyValueStore, UsageGate};
use crate::{LoanCalcError, LoanCalcResult};

const MIN_PHONE_DIGITS: usize = 9;

/// Contact details left by a prospective client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub message: String,
    /// Which calculator or page the lead came from.
    #[serde(default)]
    pub context: String,
}

/// A validated lead, stamped for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadSubmission {
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub lead: LeadForm,
}

/// Delivers leads to the back office. Transport is up to the implementor.
pub trait LeadSink {
    fn submit(&self, submission: &LeadSubmission) -> LoanCalcResult<()>;
}

fn valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // some dot with text on both sides, not necessarily the last one
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Check one field. `None` means it passes.
pub fn validate_field(field: &str, value: &str) -> Option<String> {
    match field {
        "email" if !valid_email(value) => Some("enter a valid email address".into()),
        "phone" if value.chars().filter(char::is_ascii_digit).count() < MIN_PHONE_DIGITS => {
            Some("phone number is too short".into())
        }
        "name" if value.split_whitespace().count() < 2 => {
            Some("enter both first name and surname".into())
        }
        _ => None,
    }
}

/// Validate every field, reporting all failures at once.
pub fn validate_lead(form: &LeadForm) -> LoanCalcResult<()> {
    let errors: Vec<FieldError> = [
        ("name", form.name.as_str()),
        ("phone", form.phone.as_str()),
        ("email", form.email.as_str()),
    ]
    .into_iter()
    .filter_map(|(field, value)| {
        validate_field(field, value).map(|reason| FieldError {
            field: field.to_string(),
            reason,
        })
    })
    .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(LoanCalcError::LeadValidation(errors))
    }
}

/// Validate, deliver, then lift the usage quota.
///
/// A rejected or undelivered lead leaves the gate untouched.
pub fn submit_lead<S: KeyValueStore>(
    form: LeadForm,
    sink: &impl LeadSink,
    gate: &UsageGate<S>,
) -> LoanCalcResult<LeadSubmission> {
    validate_lead(&form)?;

    let submission = LeadSubmission {
        submitted_at: Utc::now(),
        lead: form,
    };
    sink.submit(&submission)?;
    tracing::info!(context = %submission.lead.context, "lead submitted");

    gate.unlock()?;
    Ok(submission)
}
