//! Assisted execution of automation steps.
//!
//! Every screen action goes through [`AssistedExecutor`]. A step gets a
//! bounded number of automatic attempts with a fixed pause between them.
//! When they are exhausted the operator decides to retry the cycle, skip
//! the step, or abort the whole run.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::ui::{RunSummary, StepStatus, StepSummary, UserInterface};

use super::recovery::{prompt_failure_choice, FailureChoice};

/// Label used when neither the caller nor the step names it.
pub const UNNAMED_STEP: &str = "Unnamed action";

/// Signal that the operator aborted the automation.
///
/// This is not an error. It unwinds orchestration code through `?` up to
/// the command that started the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("automation aborted by the operator")]
pub struct Aborted;

/// Result type for orchestration code that can only be cut short by an abort.
pub type Flow<T = ()> = std::result::Result<T, Aborted>;

/// How a step submitted to the executor ended.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// The step produced a value.
    Success(T),
    /// The operator skipped the step after it kept failing.
    Skipped,
    /// The operator aborted the run.
    Aborted,
}

impl<T> Outcome<T> {
    /// Check if the step produced a value.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Check if the operator aborted.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Turn the outcome into a value-or-nothing, keeping abort as `Err`.
    pub fn into_result(self) -> Flow<Option<T>> {
        match self {
            Self::Success(value) => Ok(Some(value)),
            Self::Skipped => Ok(None),
            Self::Aborted => Err(Aborted),
        }
    }

    /// Map the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Skipped => Outcome::Skipped,
            Self::Aborted => Outcome::Aborted,
        }
    }
}

/// A unit of automation work.
///
/// Closures are submitted directly through [`AssistedExecutor::execute`].
/// Implement this trait when the step should carry its own description.
pub trait Step {
    /// Value produced on success.
    type Output;

    /// Run the step once.
    fn run(&mut self) -> Result<Self::Output>;

    /// Human-readable description; its first line labels the step.
    fn description(&self) -> Option<&str> {
        None
    }
}

/// A closure paired with a description.
pub struct Described<F> {
    description: String,
    action: F,
}

/// Attach a description to a closure so it can be run as a [`Step`].
pub fn described<F, T>(description: impl Into<String>, action: F) -> Described<F>
where
    F: FnMut() -> Result<T>,
{
    Described {
        description: description.into(),
        action,
    }
}

impl<F, T> Step for Described<F>
where
    F: FnMut() -> Result<T>,
{
    type Output = T;

    fn run(&mut self) -> Result<T> {
        (self.action)()
    }

    fn description(&self) -> Option<&str> {
        Some(&self.description)
    }
}

/// Automatic retry settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive attempts before the operator is asked.
    pub attempts: u32,
    /// Pause between failed attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Create a policy. At least one attempt is always made.
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Default attempts without any pause.
    pub fn immediate() -> Self {
        Self {
            delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Pick the label shown for a step.
///
/// An explicit non-blank label wins, then the first non-blank line of the
/// step description, then [`UNNAMED_STEP`].
pub fn resolve_label(explicit: Option<&str>, description: Option<&str>) -> String {
    explicit
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .or_else(|| {
            description.and_then(|d| d.lines().map(str::trim).find(|l| !l.is_empty()))
        })
        .unwrap_or(UNNAMED_STEP)
        .to_string()
}

/// Runs steps with automatic retries and an operator decision on exhaustion.
pub struct AssistedExecutor<'a> {
    ui: &'a mut dyn UserInterface,
    policy: RetryPolicy,
    records: Vec<StepSummary>,
    started: Instant,
}

impl<'a> AssistedExecutor<'a> {
    /// Create an executor reporting through `ui`.
    pub fn new(ui: &'a mut dyn UserInterface, policy: RetryPolicy) -> Self {
        Self {
            ui,
            policy,
            records: Vec::new(),
            started: Instant::now(),
        }
    }

    /// The UI used for reporting, for messages outside of steps.
    pub fn ui(&mut self) -> &mut dyn UserInterface {
        &mut *self.ui
    }

    /// The retry policy in effect.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Execute a closure as a step.
    pub fn execute<T, F>(&mut self, label: Option<&str>, step: F) -> Outcome<T>
    where
        F: FnMut() -> Result<T>,
    {
        let label = resolve_label(label, None);
        self.drive(&label, step)
    }

    /// Execute a [`Step`], falling back to its description for the label.
    pub fn execute_step<S: Step>(&mut self, label: Option<&str>, mut step: S) -> Outcome<S::Output> {
        let label = resolve_label(label, step.description());
        self.drive(&label, || step.run())
    }

    /// Steps executed so far.
    pub fn records(&self) -> &[StepSummary] {
        &self.records
    }

    /// Summary of everything executed since the executor was created.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            steps: self.records.clone(),
            total_duration: self.started.elapsed(),
            aborted: self
                .records
                .iter()
                .any(|r| r.status == StepStatus::Aborted),
        }
    }

    fn drive<T, F>(&mut self, label: &str, mut step: F) -> Outcome<T>
    where
        F: FnMut() -> Result<T>,
    {
        let started = Instant::now();
        let mut attempts = 0;

        loop {
            let error = match self.attempt_cycle(label, &mut step, &mut attempts) {
                Ok(value) => {
                    self.record(label, StepStatus::Completed, attempts, started);
                    return Outcome::Success(value);
                }
                Err(error) => error,
            };

            match prompt_failure_choice(&mut *self.ui, label, self.policy.attempts, &error) {
                Ok(FailureChoice::Retry) => {
                    info!(step = label, "operator chose to retry");
                    self.ui.message(&format!("Retrying '{}'...", label));
                }
                Ok(FailureChoice::Skip) => {
                    info!(step = label, error = %error, "operator skipped step");
                    self.ui.message(&format!("Skipping '{}'.", label));
                    self.record(label, StepStatus::Skipped, attempts, started);
                    return Outcome::Skipped;
                }
                Ok(FailureChoice::Abort) => {
                    warn!(step = label, "operator aborted the automation");
                    self.record(label, StepStatus::Aborted, attempts, started);
                    return Outcome::Aborted;
                }
                Err(prompt_error) => {
                    error!(step = label, error = %prompt_error, "failure prompt unavailable");
                    self.ui.error(&format!(
                        "Could not read a decision for '{}' ({}). Aborting.",
                        label, prompt_error
                    ));
                    self.record(label, StepStatus::Aborted, attempts, started);
                    return Outcome::Aborted;
                }
            }
        }
    }

    /// Run up to `policy.attempts` consecutive attempts, returning the last error.
    fn attempt_cycle<T, F>(&mut self, label: &str, step: &mut F, total: &mut u32) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let max = self.policy.attempts;
        let mut attempt = 1;

        loop {
            *total += 1;
            let mut spinner = self.ui.start_spinner(label);
            match step() {
                Ok(value) => {
                    spinner.finish_success(label);
                    debug!(step = label, attempt, "step completed");
                    return Ok(value);
                }
                Err(error) => {
                    spinner.finish_error(&format!("{} (attempt {}/{})", label, attempt, max));
                    warn!(step = label, attempt, max_attempts = max, error = %error, "step attempt failed");
                    self.ui.warning(&format!(
                        "{}: attempt {}/{} failed: {}",
                        label, attempt, max, error
                    ));
                    if attempt >= max {
                        return Err(error);
                    }
                    attempt += 1;
                    if !self.policy.delay.is_zero() {
                        thread::sleep(self.policy.delay);
                    }
                }
            }
        }
    }

    fn record(&mut self, label: &str, status: StepStatus, attempts: u32, started: Instant) {
        self.records.push(StepSummary {
            label: label.to_string(),
            status,
            attempts,
            duration: started.elapsed(),
        });
    }
}
