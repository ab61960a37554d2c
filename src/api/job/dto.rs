use serde::{Deserialize, Serialize};

use super::models::{JobRecord, JobStatus};

/// Plain confirmation body, e.g. after a delete
#[derive(Serialize, Deserialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

/// Per-status counts over a caller's job records
#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
pub struct JobSummary {
    pub total: usize,
    pub applied: usize,
    pub interview: usize,
    pub offer: usize,
    pub rejected: usize,
}

impl JobSummary {
    pub fn from_records(records: &[JobRecord]) -> Self {
        records
            .iter()
            .fold(JobSummary::default(), |mut summary, record| {
                summary.total += 1;
                match record.status {
                    JobStatus::Applied => summary.applied += 1,
                    JobStatus::Interview => summary.interview += 1,
                    JobStatus::Offer => summary.offer += 1,
                    JobStatus::Rejected => summary.rejected += 1,
                }
                summary
            })
    }
}
