//! Sink for completed job outputs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use crate::output::JobOutput;
use crate::queue::JobId;

/// Failure to persist a job result.
#[derive(Debug, Clone, Error)]
#[error("result store failed: {0}")]
pub struct StoreError(pub String);

/// Receives the output of every completed job.
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn store_job_result(&self, job_id: JobId, output: &JobOutput) -> Result<(), StoreError>;
}

/// Keeps results in memory.
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    results: Mutex<HashMap<JobId, JobOutput>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, job_id: JobId) -> Option<JobOutput> {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&job_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.results.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn store_job_result(&self, job_id: JobId, output: &JobOutput) -> Result<(), StoreError> {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(job_id, output.clone());
        Ok(())
    }
}
