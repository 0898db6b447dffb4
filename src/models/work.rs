use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{
    database::{Store, WorkQuery},
    duration,
    error::AppError,
    messages,
};

use super::{
    employee::Employee,
    id::{hex, hex_option},
    review::{Review, RevisionRecord, ReviewType, Reviewer},
};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    Software,
    Video,
    Review,
    Revize,
}

/// Whether the performer has finished the work.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    InProgress,
    Completed,
}

/// Review lifecycle of a video or revize.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    PendingReview,
    InReview,
    NeedsRevision,
    Approved,
}

/// Older overlay of the review decision, still read by the list queries
/// and the revize precondition.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RevisionStatus {
    NeedsRevision,
    Approved,
}

impl WorkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::Software => "software",
            WorkType::Video => "video",
            WorkType::Review => "review",
            WorkType::Revize => "revize",
        }
    }
}
impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::Completed => "completed",
        }
    }
}
impl RevisionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionStatus::NeedsRevision => "needs_revision",
            RevisionStatus::Approved => "approved",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    #[serde(with = "hex")]
    pub id: ObjectId,
    #[serde(with = "hex")]
    pub employee_id: ObjectId,
    pub employee_name: String,
    pub work_type: WorkType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_link: Option<String>,
    pub is_first_video: bool,
    pub is_revision: bool,
    pub is_reviewed: bool,
    pub is_revision_completed: bool,
    pub is_being_reviewed: bool,
    pub needs_employee_review: bool,
    pub needs_admin_review: bool,
    pub admin_reviewed: bool,
    #[serde(with = "hex_option", skip_serializing_if = "Option::is_none")]
    pub reviewed_video_id: Option<ObjectId>,
    #[serde(with = "hex_option", skip_serializing_if = "Option::is_none")]
    pub original_video_id: Option<ObjectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised_by: Option<Reviewer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revised_by_name: Option<String>,
    pub reviews: Vec<Review>,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    pub status: ProgressStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_status: Option<ReviewStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_status: Option<RevisionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision_note: Option<String>,
    pub revision_count: u32,
    pub revision_history: Vec<RevisionRecord>,
    pub review_cycle: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_review_type: Option<ReviewType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reviewer_type: Option<ReviewType>,
    /// Bumped on every write; guards read-modify-write updates.
    #[serde(skip)]
    pub version: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRequest {
    #[serde(with = "hex")]
    pub employee_id: ObjectId,
    #[serde(default)]
    pub employee_name: String,
    pub work_type: WorkType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub video_link: Option<String>,
    #[serde(default)]
    pub is_first_video: bool,
    #[serde(default)]
    pub is_revision: bool,
    #[serde(default, with = "hex_option")]
    pub reviewed_video_id: Option<ObjectId>,
    #[serde(default)]
    pub revised_by: Option<Reviewer>,
    #[serde(default)]
    pub revised_by_name: Option<String>,
    pub start_time: DateTime<Utc>,
}

impl Work {
    fn new(request: WorkRequest, employee: &Employee) -> Self {
        let employee_name = match request.employee_name.trim() {
            "" => employee.name.clone(),
            name => name.to_string(),
        };
        Work {
            id: ObjectId::new(),
            employee_id: employee.id,
            employee_name,
            work_type: request.work_type,
            description: request.description,
            video_link: request.video_link.filter(|link| !link.trim().is_empty()),
            is_first_video: request.is_first_video,
            is_revision: request.is_revision,
            is_reviewed: false,
            is_revision_completed: false,
            is_being_reviewed: false,
            needs_employee_review: false,
            needs_admin_review: false,
            admin_reviewed: false,
            reviewed_video_id: request.reviewed_video_id,
            original_video_id: None,
            revised_by: request.revised_by,
            revised_by_name: request.revised_by_name,
            reviews: Vec::new(),
            start_time: request.start_time,
            end_time: None,
            duration: None,
            duration_minutes: None,
            status: ProgressStatus::InProgress,
            work_status: None,
            revision_status: None,
            revision_note: None,
            revision_count: 0,
            revision_history: Vec::new(),
            review_cycle: 0,
            last_review_type: None,
            last_reviewer_type: None,
            version: 0,
        }
    }

    /// Videos and revize works travel the review cycle.
    pub fn is_reviewable(&self) -> bool {
        matches!(self.work_type, WorkType::Video | WorkType::Revize)
    }

    pub fn is_approved(&self) -> bool {
        self.work_status == Some(ReviewStatus::Approved)
    }

    pub(super) fn set_end_time(&mut self, end_time: DateTime<Utc>) {
        let (rendered, minutes) = duration::wall_clock(self.start_time, end_time);
        self.end_time = Some(end_time);
        self.duration = Some(rendered);
        self.duration_minutes = Some(minutes);
    }

    pub async fn create(store: &dyn Store, request: WorkRequest) -> Result<Work, AppError> {
        let employee = Employee::find_by_id(store, &request.employee_id).await?;
        let mut work = Work::new(request, &employee);

        if work.work_type == WorkType::Revize {
            let parent_id = work.reviewed_video_id.ok_or_else(|| {
                AppError::input(
                    messages::REVISION_VIDEO_REQUIRED,
                    "A revize work must reference the reviewed video",
                )
            })?;
            let parent = Work::find_by_id(store, &parent_id).await?.ok_or_else(|| {
                AppError::not_found(
                    messages::REVISION_VIDEO_NOT_FOUND,
                    "Reviewed video not found",
                )
            })?;
            if parent.revision_status != Some(RevisionStatus::NeedsRevision) {
                return Err(AppError::precondition(
                    messages::REVISION_NOT_REQUESTED,
                    "Revision has not been requested for this video",
                ));
            }
            work.reviews = parent.reviews;
            work.original_video_id = Some(parent_id);
            work.is_revision = true;
        }

        if work.is_reviewable() {
            work.work_status = Some(ReviewStatus::PendingReview);
            work.revision_count = 0;
        }

        store
            .insert_work(&work)
            .await
            .map_err(|error| AppError::from(error).on_store(messages::WORK_CREATE_FAILED))?;

        tracing::info!(
            work_id = %work.id,
            employee_id = %work.employee_id,
            work_type = work.work_type.as_str(),
            "work created"
        );
        Ok(work)
    }
    pub async fn find_by_id(store: &dyn Store, id: &ObjectId) -> Result<Option<Work>, AppError> {
        store
            .find_work(id)
            .await
            .map_err(|error| AppError::from(error).on_store(messages::WORKS_LOAD_FAILED))
    }
    pub async fn find_many(store: &dyn Store, query: &WorkQuery) -> Result<Vec<Work>, AppError> {
        store
            .find_works(query)
            .await
            .map_err(|error| AppError::from(error).on_store(messages::WORKS_LOAD_FAILED))
    }
}
