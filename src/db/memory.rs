use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::api::job::models::{JobChanges, JobDraft, JobRecord};
use crate::db::job_repository::{JobFilter, JobRepository, RepositoryError};

/// In-process job store used when no database is configured, and in tests
#[derive(Default)]
pub struct MemoryJobRepository {
    // Kept in insertion order
    records: RwLock<Vec<JobRecord>>,
}

impl MemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for MemoryJobRepository {
    async fn insert(&self, draft: JobDraft) -> Result<JobRecord, RepositoryError> {
        let now = Utc::now();
        let record = JobRecord {
            id: Uuid::new_v4(),
            owner_id: draft.owner_id,
            company: draft.company,
            role: draft.role,
            status: draft.status,
            location: draft.location,
            salary: draft.salary,
            date_applied: draft.date_applied,
            notes: draft.notes,
            link: draft.link,
            created_at: now,
            updated_at: now,
        };

        self.records.write().await.push(record.clone());
        debug!("Stored job in memory: id={}", record.id);
        Ok(record)
    }

    async fn find_many(&self, filter: &JobFilter) -> Result<Vec<JobRecord>, RepositoryError> {
        let records = self.records.read().await;

        // Later inserts win ties on created_at
        let mut found: Vec<JobRecord> = records
            .iter()
            .rev()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(found)
    }

    async fn find_one(&self, filter: &JobFilter) -> Result<Option<JobRecord>, RepositoryError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| filter.matches(record)).cloned())
    }

    async fn update_one(
        &self,
        filter: &JobFilter,
        changes: &JobChanges,
    ) -> Result<Option<JobRecord>, RepositoryError> {
        let mut records = self.records.write().await;

        let Some(record) = records.iter_mut().find(|record| filter.matches(record)) else {
            return Ok(None);
        };

        changes.apply_to(record);
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete_one(&self, filter: &JobFilter) -> Result<bool, RepositoryError> {
        let mut records = self.records.write().await;

        match records.iter().position(|record| filter.matches(record)) {
            Some(index) => {
                let removed = records.remove(index);
                debug!("Removed job from memory: id={}", removed.id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::job::models::JobStatus;
    use crate::auth::UserId;

    fn draft(owner: &str, company: &str) -> JobDraft {
        JobDraft {
            owner_id: UserId::new(owner),
            company: company.to_string(),
            role: "Engineer".to_string(),
            status: JobStatus::Applied,
            location: None,
            salary: None,
            date_applied: None,
            notes: None,
            link: None,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamps() {
        let repo = MemoryJobRepository::new();
        let a = repo.insert(draft("alice", "Acme")).await.unwrap();
        let b = repo.insert(draft("alice", "Acme")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.created_at, a.updated_at);
    }

    #[tokio::test]
    async fn find_many_returns_newest_first_even_on_timestamp_ties() {
        let repo = MemoryJobRepository::new();
        for company in ["first", "second", "third"] {
            repo.insert(draft("alice", company)).await.unwrap();
        }

        let found = repo
            .find_many(&JobFilter::owned_by(UserId::new("alice")))
            .await
            .unwrap();
        let companies: Vec<&str> = found.iter().map(|r| r.company.as_str()).collect();
        assert_eq!(companies, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn update_and_delete_respect_the_filter() {
        let repo = MemoryJobRepository::new();
        let rec = repo.insert(draft("alice", "Acme")).await.unwrap();
        let wrong_owner = JobFilter::owned_by(UserId::new("bob")).with_id(rec.id);

        let changes = JobChanges {
            company: Some("Evil".to_string()),
            ..Default::default()
        };
        assert!(repo.update_one(&wrong_owner, &changes).await.unwrap().is_none());
        assert!(!repo.delete_one(&wrong_owner).await.unwrap());

        let owned = JobFilter::owned_by(UserId::new("alice")).with_id(rec.id);
        let stored = repo.find_one(&owned).await.unwrap().unwrap();
        assert_eq!(stored.company, "Acme");

        assert!(repo.delete_one(&owned).await.unwrap());
        assert!(repo.find_one(&owned).await.unwrap().is_none());
    }
}
