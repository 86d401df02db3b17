//! Background job status store.
//!
//! A single task owns every job record. Handles talk to it over a channel;
//! reads get a snapshot back through a oneshot reply. Only the most recent
//! finished or failed jobs are retained.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::features::srs::RecomputeSummary;

pub type JobId = u64;

const RETAINED_FINISHED_JOBS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Finished { summary: RecomputeSummary },
    Failed { message: String },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished { .. } | JobStatus::Failed { .. })
    }
}

#[derive(Debug)]
enum JobMessage {
    Create(oneshot::Sender<JobId>),
    Update(JobId, JobStatus),
    Snapshot(JobId, oneshot::Sender<Option<JobStatus>>),
}

/// Cloneable handle to the job store task
#[derive(Debug, Clone)]
pub struct JobStore {
    sender: mpsc::Sender<JobMessage>,
}

impl JobStore {
    /// Spawns the owning task on the current runtime
    pub fn spawn() -> Self {
        Self::spawn_with_retention(RETAINED_FINISHED_JOBS)
    }

    /// Like [`JobStore::spawn`], keeping at most `retained` finished jobs
    pub fn spawn_with_retention(retained: usize) -> Self {
        let (sender, receiver) = mpsc::channel(64);
        tokio::spawn(job_loop(receiver, retained));
        Self { sender }
    }

    /// Registers a new job in the `Pending` state
    pub async fn create(&self) -> Option<JobId> {
        let (reply, response) = oneshot::channel();
        self.sender.send(JobMessage::Create(reply)).await.ok()?;
        response.await.ok()
    }

    pub async fn update(&self, id: JobId, status: JobStatus) {
        if self.sender.send(JobMessage::Update(id, status)).await.is_err() {
            log::warn!("Job store closed, dropping status update for job {}", id);
        }
    }

    pub async fn snapshot(&self, id: JobId) -> Option<JobStatus> {
        let (reply, response) = oneshot::channel();
        self.sender.send(JobMessage::Snapshot(id, reply)).await.ok()?;
        response.await.ok().flatten()
    }
}

async fn job_loop(mut receiver: mpsc::Receiver<JobMessage>, retained: usize) {
    let mut jobs: HashMap<JobId, JobStatus> = HashMap::new();
    // Terminal jobs, oldest first
    let mut finished: VecDeque<JobId> = VecDeque::new();
    let mut next_id: JobId = 1;

    while let Some(message) = receiver.recv().await {
        match message {
            JobMessage::Create(reply) => {
                let id = next_id;
                next_id += 1;
                jobs.insert(id, JobStatus::Pending);
                let _ = reply.send(id);
            }
            JobMessage::Update(id, status) => {
                let Some(current) = jobs.get_mut(&id) else {
                    log::warn!("Status update for unknown job {}", id);
                    continue;
                };
                let newly_terminal = status.is_terminal() && !current.is_terminal();
                *current = status;
                if newly_terminal {
                    finished.push_back(id);
                    while finished.len() > retained {
                        if let Some(oldest) = finished.pop_front() {
                            jobs.remove(&oldest);
                            log::debug!("Evicted finished job {}", oldest);
                        }
                    }
                }
            }
            JobMessage::Snapshot(id, reply) => {
                let _ = reply.send(jobs.get(&id).cloned());
            }
        }
    }

    log::debug!("Job store stopped with {} jobs", jobs.len());
}
