#![cfg(feature = "leads")]

use loan_calc_core::gate::{GateDecision, GateState, MemoryStore, UsageGate};
use loan_calc_core::leads::{submit_lead, validate_lead, LeadForm, LeadSink, LeadSubmission};
use loan_calc_core::{LoanCalcError, LoanCalcResult};
use std::cell::RefCell;

#[derive(Default)]
struct RecordingSink {
    received: RefCell<Vec<LeadSubmission>>,
    fail: bool,
}

impl LeadSink for RecordingSink {
    fn submit(&self, submission: &LeadSubmission) -> LoanCalcResult<()> {
        if self.fail {
            return Err(LoanCalcError::Submission("backend unreachable".into()));
        }
        self.received.borrow_mut().push(submission.clone());
        Ok(())
    }
}

fn good_lead() -> LeadForm {
    LeadForm {
        name: "Jan Kowalski".into(),
        phone: "600 100 200".into(),
        email: "jan@example.pl".into(),
        message: String::new(),
        context: "Mortgage: 400000".into(),
    }
}

fn locked_gate() -> UsageGate<MemoryStore> {
    let gate = UsageGate::new(MemoryStore::new());
    for _ in 0..4 {
        gate.check_and_record_entry();
    }
    assert_eq!(gate.state(), GateState::Locked);
    gate
}

#[test]
fn test_all_bad_fields_reported_together() {
    let form = LeadForm {
        name: "Jan".into(),
        phone: "123".into(),
        email: "nope".into(),
        ..LeadForm::default()
    };
    match validate_lead(&form) {
        Err(LoanCalcError::LeadValidation(fields)) => {
            let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
            assert_eq!(names, vec!["name", "phone", "email"]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_valid_lead_unlocks_gate() {
    let gate = locked_gate();
    let sink = RecordingSink::default();

    let submission = submit_lead(good_lead(), &sink, &gate).unwrap();
    assert_eq!(submission.lead.context, "Mortgage: 400000");
    assert_eq!(sink.received.borrow().len(), 1);
    assert_eq!(gate.check_and_record_entry(), GateDecision::Allowed);
}

#[test]
fn test_invalid_lead_keeps_gate_locked() {
    let gate = locked_gate();
    let sink = RecordingSink::default();
    let mut form = good_lead();
    form.email = "jan@example".into();

    assert!(submit_lead(form, &sink, &gate).is_err());
    assert!(sink.received.borrow().is_empty());
    assert_eq!(gate.state(), GateState::Locked);
}

#[test]
fn test_failed_delivery_keeps_gate_locked() {
    let gate = locked_gate();
    let sink = RecordingSink {
        fail: true,
        ..RecordingSink::default()
    };
    assert!(matches!(
        submit_lead(good_lead(), &sink, &gate),
        Err(LoanCalcError::Submission(_))
    ));
    assert_eq!(gate.state(), GateState::Locked);
}
