use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, QueryBuilder};
use tracing::debug;

use crate::api::job::models::{JobChanges, JobDraft, JobRecord};
use crate::db::job_repository::{JobFilter, JobRepository, RepositoryError};
use crate::db::models::JobRow;

const COLUMNS: &str = "id, owner_id, company, role, status, location, salary, date_applied, \
                       notes, link, created_at, updated_at";

/// PostgreSQL-backed job store
pub struct PgJobRepository {
    pool: Pool<Postgres>,
}

impl PgJobRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Append ` WHERE ...` for `filter`; the owner clause always comes first
fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
    query
        .push(" WHERE owner_id = ")
        .push_bind(filter.owner_id().as_str().to_string());

    if let Some(id) = filter.id() {
        query.push(" AND id = ").push_bind(id);
    }
    if let Some(status) = filter.status() {
        query.push(" AND status = ").push_bind(status.as_str());
    }
    // strpos keeps the needle literal, unlike LIKE/regex patterns
    if let Some(company) = filter.company() {
        query
            .push(" AND strpos(lower(company), lower(")
            .push_bind(company.to_string())
            .push(")) > 0");
    }
    if let Some(search) = filter.search() {
        query
            .push(" AND (strpos(lower(company), lower(")
            .push_bind(search.to_string())
            .push(")) > 0 OR strpos(lower(role), lower(")
            .push_bind(search.to_string())
            .push(")) > 0)");
    }
}

/// Narrow `query` to the single row `filter` targets
///
/// An id filter already pins one row; otherwise the first match is picked
/// through a subselect so the owner clause still leads the inner WHERE.
fn push_target(query: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
    if filter.id().is_some() {
        push_filter(query, filter);
    } else {
        query.push(" WHERE id = (SELECT id FROM job_applications");
        push_filter(query, filter);
        query.push(" LIMIT 1)");
    }
}

fn select_query(filter: &JobFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {COLUMNS} FROM job_applications"));
    push_filter(&mut query, filter);
    query
}

fn update_query(filter: &JobFilter, changes: &JobChanges) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("UPDATE job_applications SET updated_at = NOW()");

    if let Some(company) = &changes.company {
        query.push(", company = ").push_bind(company.clone());
    }
    if let Some(role) = &changes.role {
        query.push(", role = ").push_bind(role.clone());
    }
    if let Some(status) = changes.status {
        query.push(", status = ").push_bind(status.as_str());
    }
    if let Some(location) = &changes.location {
        query.push(", location = ").push_bind(location.clone());
    }
    if let Some(salary) = &changes.salary {
        query.push(", salary = ").push_bind(salary.clone().map(Json));
    }
    if let Some(date_applied) = changes.date_applied {
        query.push(", date_applied = ").push_bind(date_applied);
    }
    if let Some(notes) = &changes.notes {
        query.push(", notes = ").push_bind(notes.clone());
    }
    if let Some(link) = &changes.link {
        query.push(", link = ").push_bind(link.clone());
    }

    push_target(&mut query, filter);
    query.push(format!(" RETURNING {COLUMNS}"));
    query
}

fn delete_query(filter: &JobFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("DELETE FROM job_applications");
    push_target(&mut query, filter);
    query
}

fn into_records(rows: Vec<JobRow>) -> Result<Vec<JobRecord>, RepositoryError> {
    rows.into_iter().map(JobRecord::try_from).collect()
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn insert(&self, draft: JobDraft) -> Result<JobRecord, RepositoryError> {
        debug!(
            "Creating job: owner={}, company={}, status={}",
            draft.owner_id, draft.company, draft.status
        );

        let row = sqlx::query_as::<_, JobRow>(&format!(
            r#"
            INSERT INTO job_applications
                (owner_id, company, role, status, location, salary, date_applied, notes, link)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(draft.owner_id.as_str())
        .bind(&draft.company)
        .bind(&draft.role)
        .bind(draft.status.as_str())
        .bind(&draft.location)
        .bind(draft.salary.map(Json))
        .bind(draft.date_applied)
        .bind(&draft.notes)
        .bind(&draft.link)
        .fetch_one(&self.pool)
        .await?;

        debug!("Job created with id={}", row.id);
        row.try_into()
    }

    async fn find_many(&self, filter: &JobFilter) -> Result<Vec<JobRecord>, RepositoryError> {
        let mut query = select_query(filter);
        query.push(" ORDER BY created_at DESC");

        let rows = query
            .build_query_as::<JobRow>()
            .fetch_all(&self.pool)
            .await?;

        debug!("Found {} jobs for owner={}", rows.len(), filter.owner_id());
        into_records(rows)
    }

    async fn find_one(&self, filter: &JobFilter) -> Result<Option<JobRecord>, RepositoryError> {
        let mut query = select_query(filter);
        query.push(" LIMIT 1");

        query
            .build_query_as::<JobRow>()
            .fetch_optional(&self.pool)
            .await?
            .map(JobRecord::try_from)
            .transpose()
    }

    async fn update_one(
        &self,
        filter: &JobFilter,
        changes: &JobChanges,
    ) -> Result<Option<JobRecord>, RepositoryError> {
        let row = update_query(filter, changes)
            .build_query_as::<JobRow>()
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = &row {
            debug!("Job updated: id={}", row.id);
        }
        row.map(JobRecord::try_from).transpose()
    }

    async fn delete_one(&self, filter: &JobFilter) -> Result<bool, RepositoryError> {
        let result = delete_query(filter).build().execute(&self.pool).await?;
        debug!("Delete affected {} rows", result.rows_affected());
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
