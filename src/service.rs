//! The façade the presentation layer talks to.
//!
//! Each operation is exactly one transaction: it either commits fully or rolls
//! back fully. Store failures come back as [`ServiceError`], with the store
//! error kept as the source.

use thiserror::Error;

use crate::db::{self, Database};
use crate::error::DbError;
use crate::models::*;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("project with ID={0} does not exist")]
    NotFound(ProjectId),

    #[error("{operation}: constraint violated")]
    ConstraintViolation {
        operation: &'static str,
        #[source]
        source: DbError,
    },

    #[error("{operation}: transaction failed and was rolled back")]
    TransactionFailure {
        operation: &'static str,
        #[source]
        source: DbError,
    },
}

impl ServiceError {
    fn from_db(operation: &'static str, err: DbError) -> Self {
        match err {
            DbError::NotFound {
                entity: "project",
                id,
            } => Self::NotFound(id),
            err if err.is_constraint_violation() => Self::ConstraintViolation {
                operation,
                source: err,
            },
            err => Self::TransactionFailure {
                operation,
                source: err,
            },
        }
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(Clone)]
pub struct ProjectService {
    db: Database,
}

impl ProjectService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn add_project(&self, input: CreateProjectInput) -> ServiceResult<ProjectAggregate> {
        let aggregate = self.run("add_project", |conn| db::project::insert(conn, &input))?;
        tracing::info!(
            "Created project {} ({})",
            aggregate.project.id,
            aggregate.project.name
        );
        Ok(aggregate)
    }

    pub fn fetch_all_projects(&self) -> ServiceResult<Vec<ProjectSummary>> {
        self.run("fetch_all_projects", db::project::fetch_all)
    }

    pub fn fetch_project_by_id(&self, id: ProjectId) -> ServiceResult<ProjectAggregate> {
        self.run("fetch_project_by_id", |conn| db::project::fetch_by_id(conn, id))
    }

    /// Replace the scalar fields of a project, and its category links when
    /// the input carries them, then return the refreshed aggregate.
    pub fn modify_project_details(
        &self,
        id: ProjectId,
        input: UpdateProjectInput,
    ) -> ServiceResult<ProjectAggregate> {
        let aggregate = self.run("modify_project_details", |conn| {
            db::project::update(conn, id, &input)?;
            db::project::fetch_by_id(conn, id)
        })?;
        tracing::info!("Updated project {}", id);
        Ok(aggregate)
    }

    pub fn delete_project(&self, id: ProjectId) -> ServiceResult<()> {
        self.run("delete_project", |conn| db::project::delete(conn, id))?;
        tracing::info!("Deleted project {}", id);
        Ok(())
    }

    fn run<T, F>(&self, operation: &'static str, work: F) -> ServiceResult<T>
    where
        F: FnOnce(&rusqlite::Connection) -> Result<T, DbError>,
    {
        self.db
            .with_transaction(work)
            .map_err(|err| ServiceError::from_db(operation, err))
    }
}
