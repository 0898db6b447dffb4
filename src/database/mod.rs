use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

use crate::models::{
    employee::Employee,
    work::{ProgressStatus, RevisionStatus, Work, WorkType},
};

#[cfg(test)]
pub mod memory;
pub mod mongo;

pub use mongo::connect;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("database operation timed out")]
    Timeout,

    #[error("malformed document: {0}")]
    Document(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevisionStatusFilter {
    Is(RevisionStatus),
    /// Matches rows without a revision status as well.
    Not(RevisionStatus),
}

/// Conjunction of optional constraints over the `works` collection.
#[derive(Clone, Debug, Default)]
pub struct WorkQuery {
    pub employee_id: Option<ObjectId>,
    pub work_type: Option<WorkType>,
    pub status: Option<ProgressStatus>,
    pub revision_status: Option<RevisionStatusFilter>,
    pub reviewed_video_id: Option<ObjectId>,
    /// Inclusive bounds on `startTime`.
    pub started_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Inclusive bounds on `endTime`.
    pub ended_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    pub has_reviews: bool,
}

impl WorkQuery {
    /// In-process evaluation of the filter, used by the memory store.
    #[cfg(test)]
    pub fn matches(&self, work: &Work) -> bool {
        let within =
            |instant: Option<DateTime<Utc>>, bounds: &Option<(DateTime<Utc>, DateTime<Utc>)>| {
                match bounds {
                    Some((from, to)) => instant.map_or(false, |at| *from <= at && at <= *to),
                    None => true,
                }
            };

        self.employee_id.map_or(true, |id| work.employee_id == id)
            && self.work_type.map_or(true, |kind| work.work_type == kind)
            && self.status.map_or(true, |status| work.status == status)
            && match &self.revision_status {
                Some(RevisionStatusFilter::Is(status)) => work.revision_status == Some(*status),
                Some(RevisionStatusFilter::Not(status)) => work.revision_status != Some(*status),
                None => true,
            }
            && self
                .reviewed_video_id
                .map_or(true, |id| work.reviewed_video_id == Some(id))
            && within(Some(work.start_time), &self.started_between)
            && within(work.end_time, &self.ended_between)
            && (!self.has_reviews || !work.reviews.is_empty())
    }
}

/// The two collections the service owns. Implementations must be safe to
/// share across request handlers.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError>;
    async fn find_employee(&self, id: &ObjectId) -> Result<Option<Employee>, StoreError>;
    async fn find_employees(&self, include_deleted: bool) -> Result<Vec<Employee>, StoreError>;
    /// Stamps `deletedAt` unless already set, so the first deletion time
    /// sticks. Returns whether the employee exists.
    async fn soft_delete_employee(
        &self,
        id: &ObjectId,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    async fn insert_work(&self, work: &Work) -> Result<(), StoreError>;
    async fn find_work(&self, id: &ObjectId) -> Result<Option<Work>, StoreError>;
    async fn find_works(&self, query: &WorkQuery) -> Result<Vec<Work>, StoreError>;
    /// Writes `work` only if the stored version still equals
    /// `expected_version`. Returns whether the write happened.
    async fn replace_work(&self, work: &Work, expected_version: i64) -> Result<bool, StoreError>;
}
