//! Named, ordered workflow steps with declared compensation.
//!
//! Workflows run their side effects through a [`Saga`] so that ordering is
//! explicit and the state left behind by a failure is visible: each [`Step`]
//! declares what, if anything, undoes it. None of the current steps can be
//! undone automatically, so a failure logs every completed step together
//! with the gap it leaves.
use std::future::Future;

use thiserror::Error;

/// What happens to a completed step when a later step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compensation {
    /// The step has no externally visible effect.
    NotNeeded,
    /// The effect stays in place. `gap` describes what is left behind.
    None { gap: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub name: &'static str,
    pub compensation: Compensation,
}

impl Step {
    pub const fn new(name: &'static str, compensation: Compensation) -> Self {
        Self { name, compensation }
    }

    /// Side-effect free step.
    pub const fn pure(name: &'static str) -> Self {
        Self::new(name, Compensation::NotNeeded)
    }

    /// Step whose effect is kept when the workflow fails later on.
    pub const fn uncompensated(name: &'static str, gap: &'static str) -> Self {
        Self::new(name, Compensation::None { gap })
    }
}

/// A step failed. `left_behind` lists completed steps whose effects remain.
#[derive(Debug, Error)]
#[error("{saga} failed at step `{step}`: {source}")]
pub struct SagaError<E: std::error::Error + 'static> {
    pub saga: &'static str,
    pub step: &'static str,
    pub left_behind: Vec<&'static str>,
    #[source]
    pub source: E,
}

impl<E: std::error::Error + 'static> SagaError<E> {
    pub fn into_source(self) -> E {
        self.source
    }
}

/// Runs steps in order and remembers which have completed.
#[derive(Debug)]
pub struct Saga {
    name: &'static str,
    completed: Vec<Step>,
}

impl Saga {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            completed: Vec::new(),
        }
    }

    /// Await `work` as `step`. On error nothing further runs; completed
    /// steps with effects are logged and reported in the error.
    pub async fn run<T, E, F>(&mut self, step: Step, work: F) -> Result<T, SagaError<E>>
    where
        E: std::error::Error + 'static,
        F: Future<Output = Result<T, E>>,
    {
        tracing::debug!(saga = self.name, step = step.name, "step started");
        match work.await {
            Ok(value) => {
                self.completed.push(step);
                Ok(value)
            }
            Err(source) => {
                tracing::error!(saga = self.name, step = step.name, error = %source, "step failed");
                let left_behind = self.left_behind();
                Err(SagaError {
                    saga: self.name,
                    step: step.name,
                    left_behind,
                    source,
                })
            }
        }
    }

    /// Names of completed steps, in order.
    pub fn completed(&self) -> Vec<&'static str> {
        self.completed.iter().map(|s| s.name).collect()
    }

    fn left_behind(&self) -> Vec<&'static str> {
        self.completed
            .iter()
            .filter_map(|step| match step.compensation {
                Compensation::NotNeeded => None,
                Compensation::None { gap } => {
                    tracing::warn!(saga = self.name, step = step.name, gap, "no compensation");
                    Some(step.name)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    const WRITE: Step = Step::uncompensated("write", "row stays");
    const RENDER: Step = Step::pure("render");
    const SEND: Step = Step::uncompensated("send", "mail is out");

    #[tokio::test]
    async fn runs_steps_in_order() {
        let mut saga = Saga::new("test");
        let a = saga.run(WRITE, async { Ok::<_, Boom>(1) }).await.unwrap();
        let b = saga.run(RENDER, async { Ok::<_, Boom>(a + 1) }).await.unwrap();
        assert_eq!(b, 2);
        assert_eq!(saga.completed(), vec!["write", "render"]);
    }

    #[tokio::test]
    async fn failure_reports_uncompensated_steps() {
        let mut saga = Saga::new("test");
        saga.run(WRITE, async { Ok::<_, Boom>(()) }).await.unwrap();
        saga.run(RENDER, async { Ok::<_, Boom>(()) }).await.unwrap();
        let err = saga
            .run(SEND, async { Err::<(), _>(Boom) })
            .await
            .unwrap_err();

        assert_eq!(err.step, "send");
        assert_eq!(err.left_behind, vec!["write"]);
        assert_eq!(err.to_string(), "test failed at step `send`: boom");
        assert_eq!(saga.completed(), vec!["write", "render"]);
    }

    #[tokio::test]
    async fn first_step_failure_leaves_nothing_behind() {
        let mut saga = Saga::new("test");
        let err = saga
            .run(WRITE, async { Err::<(), _>(Boom) })
            .await
            .unwrap_err();
        assert!(err.left_behind.is_empty());
    }
}
