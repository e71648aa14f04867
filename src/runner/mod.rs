//! Step execution with retries and operator recovery.

pub mod engine;
pub mod recovery;

pub use engine::{
    described, resolve_label, Aborted, AssistedExecutor, Described, Flow, Outcome, RetryPolicy,
    Step, UNNAMED_STEP,
};
pub use recovery::{parse_choice, prompt_failure_choice, FailureChoice, FAILURE_PROMPT_KEY};
