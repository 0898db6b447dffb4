//! Partial updates of a work and the review state machine they drive.
//!
//! An update is computed as a pure function of the stored work, the patch
//! and the current instant, then written back only if nobody else wrote in
//! between.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{de::IntoDeserializer, Deserialize, Deserializer};

use crate::{calendar::Clock, database::Store, error::AppError, messages};

use super::{
    review::{RecordStatus, Review, RevisionRecord, ReviewType, APPROVAL_COMMENT},
    work::{ProgressStatus, ReviewStatus, RevisionStatus, Work, WorkType},
};

const MAX_UPDATE_ATTEMPTS: usize = 3;

/// Absent fields are left alone. For the nested options an explicit `null`
/// clears the stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkPatch {
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "present")]
    pub video_link: Option<Option<String>>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present_revision_status")]
    pub revision_status: Option<Option<RevisionStatus>>,
    #[serde(default, deserialize_with = "present")]
    pub revision_note: Option<Option<String>>,
    pub status: Option<ProgressStatus>,
    pub reviews: Option<Vec<Review>>,
    pub is_being_reviewed: Option<bool>,
    pub is_revision_completed: Option<bool>,
    pub work_type: Option<WorkType>,
    pub admin_reviewed: Option<bool>,
    pub work_status: Option<ReviewStatus>,
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Older consoles send `""` to mean "no decision".
fn present_revision_status<'de, D>(
    deserializer: D,
) -> Result<Option<Option<RevisionStatus>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(Some(None)),
        Some(raw) if raw.is_empty() => Ok(Some(None)),
        Some(raw) => RevisionStatus::deserialize(
            IntoDeserializer::<D::Error>::into_deserializer(raw.as_str()),
        )
        .map(|status| Some(Some(status))),
    }
}

impl Work {
    /// The state this work moves to under `patch` at instant `now`.
    pub fn apply(&self, patch: &WorkPatch, now: DateTime<Utc>) -> Result<Work, AppError> {
        let mut next = self.clone();
        let reviewable = self.is_reviewable();
        let completed = self.status == ProgressStatus::Completed;

        if completed && self.work_type == WorkType::Video {
            let edits_description = patch
                .description
                .as_ref()
                .map_or(false, |description| *description != self.description);
            let edits_link = patch
                .video_link
                .as_ref()
                .map_or(false, |link| *link != self.video_link);
            if edits_description || edits_link {
                return Err(AppError::forbidden(
                    messages::WORK_COMPLETED_VIDEO_LOCKED,
                    "Description and link of a completed video cannot be changed",
                ));
            }
        }
        if completed && patch.status == Some(ProgressStatus::InProgress) {
            return Err(AppError::precondition(
                messages::WORK_ALREADY_COMPLETED,
                "A completed work cannot be reopened",
            ));
        }

        if let Some(end_time) = patch.end_time {
            if end_time < self.start_time {
                return Err(AppError::input(
                    messages::WORK_INVALID_END_TIME,
                    "endTime must not precede startTime",
                ));
            }
            next.set_end_time(end_time);
        }
        if let Some(link) = &patch.video_link {
            next.video_link = link.clone();
        }
        if let Some(description) = &patch.description {
            next.description = description.clone();
        }
        if let Some(note) = &patch.revision_note {
            next.revision_note = note.clone();
        }
        if let Some(status) = patch.revision_status {
            if !self.is_approved() {
                next.revision_status = status;
            }
        }
        if let Some(flag) = patch.is_being_reviewed {
            next.is_being_reviewed = flag;
        }
        if let Some(flag) = patch.is_revision_completed {
            next.is_revision_completed = flag;
        }
        if let Some(work_type) = patch.work_type {
            next.work_type = work_type;
            if next.is_reviewable() && next.work_status.is_none() {
                next.work_status = Some(ReviewStatus::PendingReview);
            }
        }

        let appended = match &patch.reviews {
            Some(reviews) => extend_reviews(&self.reviews, reviews)?,
            None => Vec::new(),
        };
        next.reviews.extend(appended.iter().cloned());

        // Completion. Setting an end time alone finishes the work too.
        let completes = match patch.status {
            Some(status) => status == ProgressStatus::Completed,
            None => patch.end_time.is_some(),
        };
        if completes && !completed {
            if next.end_time.is_none() {
                next.set_end_time(now);
            }
            next.status = ProgressStatus::Completed;
            if reviewable {
                next.work_status = Some(ReviewStatus::PendingReview);
                next.needs_admin_review = true;
            }
        }

        if !reviewable || self.is_approved() {
            next.version = self.version + 1;
            return Ok(next);
        }
        let finished = next.status == ProgressStatus::Completed;

        if finished {
            for review in &appended {
                next.record(RevisionRecord::from_review(review));
                next.request_revision(ReviewType::Employee);
                next.needs_admin_review = true;
            }
        }

        if patch.is_being_reviewed == Some(true)
            && finished
            && next.work_status == Some(ReviewStatus::PendingReview)
        {
            next.work_status = Some(ReviewStatus::InReview);
        }

        if patch.admin_reviewed == Some(true) {
            let decision = match patch.work_status {
                Some(ReviewStatus::NeedsRevision) => Some(RecordStatus::NeedsRevision),
                Some(ReviewStatus::Approved) => Some(RecordStatus::Approved),
                _ => None,
            };
            if let Some(decision) = decision {
                if !finished {
                    return Err(AppError::precondition(
                        messages::WORK_NOT_COMPLETED,
                        "Only completed videos can be reviewed",
                    ));
                }
                next.admin_decision(decision, now);
            }
        }

        next.version = self.version + 1;
        Ok(next)
    }

    fn admin_decision(&mut self, decision: RecordStatus, now: DateTime<Utc>) {
        self.admin_reviewed = true;
        self.needs_admin_review = false;
        if decision == RecordStatus::Approved {
            self.record(RevisionRecord::admin(decision, APPROVAL_COMMENT, now));
            self.work_status = Some(ReviewStatus::Approved);
            self.revision_status = Some(RevisionStatus::Approved);
            self.needs_employee_review = false;
            self.note_decision(ReviewType::Admin);
        } else {
            let note = self.revision_note.clone().unwrap_or_default();
            self.record(RevisionRecord::admin(decision, &note, now));
            // the revize performer reads the note from the inherited reviews
            self.reviews.push(Review::admin(&note, now));
            self.request_revision(ReviewType::Admin);
            self.needs_employee_review = true;
        }
    }

    fn request_revision(&mut self, by: ReviewType) {
        self.work_status = Some(ReviewStatus::NeedsRevision);
        self.revision_status = Some(RevisionStatus::NeedsRevision);
        self.note_decision(by);
    }

    fn note_decision(&mut self, by: ReviewType) {
        self.is_reviewed = true;
        self.review_cycle += 1;
        self.last_review_type = Some(by);
        self.last_reviewer_type = Some(by);
    }

    fn record(&mut self, record: RevisionRecord) {
        self.revision_history.push(record);
        self.revision_count += 1;
    }

    pub async fn update(
        store: &dyn Store,
        clock: &dyn Clock,
        id: &ObjectId,
        patch: &WorkPatch,
    ) -> Result<Work, AppError> {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let current = Work::find_by_id(store, id).await?.ok_or_else(|| {
                AppError::not_found(messages::WORK_NOT_FOUND, "Work not found")
            })?;
            let next = current.apply(patch, clock.now())?;

            let written = store
                .replace_work(&next, current.version)
                .await
                .map_err(|error| AppError::from(error).on_store(messages::WORK_UPDATE_FAILED))?;
            if written {
                tracing::info!(
                    work_id = %id,
                    status = next.status.as_str(),
                    work_status = ?next.work_status,
                    "work updated"
                );
                return Ok(next);
            }
            tracing::debug!(work_id = %id, attempt, "work changed during update, retrying");
        }
        Err(AppError::conflict(
            messages::WORK_CONFLICT,
            "Work was modified concurrently",
        ))
    }
}

/// New reviews must extend the stored ones; returns the appended tail.
/// Entries are compared by author and comment since consoles may echo
/// timestamps back at a coarser precision.
fn extend_reviews(stored: &[Review], incoming: &[Review]) -> Result<Vec<Review>, AppError> {
    let keeps_prefix = incoming.len() >= stored.len()
        && stored.iter().zip(incoming).all(|(old, new)| {
            old.reviewer_id == new.reviewer_id && old.comment == new.comment
        });
    if !keeps_prefix {
        return Err(AppError::input(
            messages::WORK_REVIEWS_APPEND_ONLY,
            "reviews may only be appended",
        ));
    }
    Ok(incoming[stored.len()..].to_vec())
}
