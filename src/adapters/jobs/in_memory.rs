//! In-memory job dispatcher for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{JobDispatcher, JobError, JobEvent};

/// In-memory implementation of the JobDispatcher port.
///
/// Records dispatched events for assertions; can be flipped to fail every
/// dispatch to exercise error paths.
#[derive(Debug, Default)]
pub struct InMemoryJobDispatcher {
    events: Mutex<Vec<JobEvent>>,
    fail: Mutex<bool>,
}

impl InMemoryJobDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every dispatch fail with a `JobError`.
    pub fn failing() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            fail: Mutex::new(true),
        }
    }

    /// Events dispatched so far.
    pub fn dispatched(&self) -> Vec<JobEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn dispatched_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

#[async_trait]
impl JobDispatcher for InMemoryJobDispatcher {
    async fn dispatch(&self, event: JobEvent) -> Result<(), JobError> {
        if *self.fail.lock().unwrap() {
            return Err(JobError::Dispatch("in-memory dispatcher failing".to_string()));
        }

        self.events.lock().unwrap().push(event);
        Ok(())
    }
}
