//! Shared fixtures for verifier BDD scenarios.

use std::cell::RefCell;
use std::rc::Rc;

use flexcheck::test_support::ScriptedLister;
use rstest::fixture;

#[derive(Clone, Debug)]
pub enum LookupOutcome {
    Found(String),
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct VerifyContext {
    pub lister: ScriptedLister,
    pub job_id: Rc<RefCell<Option<String>>>,
    pub outcome: Rc<RefCell<Option<LookupOutcome>>>,
}

impl VerifyContext {
    pub fn job_id(&self) -> String {
        self.job_id
            .borrow()
            .clone()
            .unwrap_or_else(|| panic!("test setup requires a dataflow job"))
    }

    pub fn record(&self, outcome: LookupOutcome) {
        *self.outcome.borrow_mut() = Some(outcome);
    }

    pub fn outcome(&self) -> Option<LookupOutcome> {
        self.outcome.borrow().clone()
    }
}

#[fixture]
pub fn verify_context() -> VerifyContext {
    VerifyContext {
        lister: ScriptedLister::new(),
        job_id: Rc::new(RefCell::new(None)),
        outcome: Rc::new(RefCell::new(None)),
    }
}
