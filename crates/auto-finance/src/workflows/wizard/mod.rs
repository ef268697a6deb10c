//! Guided financing journey: home, profile form, vehicle pick, results and
//! analysis.
//!
//! [`WizardSession::apply`] is the pure transition function; the
//! [`WizardStateMachine`] wraps it with the delays, advisory calls and
//! cancellation that the asynchronous steps need.

pub mod machine;
pub mod state;


use crate::workflows::financing::CatalogError;

pub use machine::WizardStateMachine;
pub use state::{
    TransitionError, TransitionPolicy, WizardEvent, WizardSession, WizardStep, WizardTiming,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
    #[error("work for epoch {epoch} was superseded")]
    Superseded { epoch: u64 },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
