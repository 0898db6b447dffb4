use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

use super::work::{ProgressStatus, Work};

pub const ADMIN_ID: &str = "admin";
pub const ADMIN_NAME: &str = "Admin";
pub const APPROVAL_COMMENT: &str = "Video onaylandı";

/// Who left a review. The admin console has no employee record and is
/// identified by the literal `admin`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reviewer {
    Admin,
    Employee(ObjectId),
}

impl fmt::Display for Reviewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reviewer::Admin => f.write_str(ADMIN_ID),
            Reviewer::Employee(id) => f.write_str(&id.to_hex()),
        }
    }
}
impl FromStr for Reviewer {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw == ADMIN_ID {
            return Ok(Reviewer::Admin);
        }
        ObjectId::parse_str(raw)
            .map(Reviewer::Employee)
            .map_err(|_| format!("invalid reviewer `{raw}`"))
    }
}
impl Serialize for Reviewer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
impl<'de> Deserialize<'de> for Reviewer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewType {
    Admin,
    Employee,
    Revize,
}

/// Outcome stored on a revision record. Synthetic records built from
/// revize works carry the child's progress instead of a decision.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    NeedsRevision,
    Approved,
    InProgress,
    Completed,
}

impl From<ProgressStatus> for RecordStatus {
    fn from(status: ProgressStatus) -> Self {
        match status {
            ProgressStatus::InProgress => RecordStatus::InProgress,
            ProgressStatus::Completed => RecordStatus::Completed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub reviewer_id: Reviewer,
    pub reviewer_name: String,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionRecord {
    pub reviewer_id: Reviewer,
    pub reviewer_name: String,
    pub review_type: ReviewType,
    pub comment: String,
    pub revision_date: DateTime<Utc>,
    pub status: RecordStatus,
}

impl Review {
    pub fn admin(comment: &str, at: DateTime<Utc>) -> Self {
        Review {
            reviewer_id: Reviewer::Admin,
            reviewer_name: ADMIN_NAME.to_string(),
            comment: comment.to_string(),
            created_at: at,
        }
    }
}

impl RevisionRecord {
    pub fn admin(status: RecordStatus, comment: &str, at: DateTime<Utc>) -> Self {
        RevisionRecord {
            reviewer_id: Reviewer::Admin,
            reviewer_name: ADMIN_NAME.to_string(),
            review_type: ReviewType::Admin,
            comment: comment.to_string(),
            revision_date: at,
            status,
        }
    }
    /// Mirrors an employee review that asks for a revision.
    pub fn from_review(review: &Review) -> Self {
        RevisionRecord {
            reviewer_id: review.reviewer_id.clone(),
            reviewer_name: review.reviewer_name.clone(),
            review_type: ReviewType::Employee,
            comment: review.comment.clone(),
            revision_date: review.created_at,
            status: RecordStatus::NeedsRevision,
        }
    }
    /// Summarizes a revize work done against a parent video.
    pub fn from_revize(child: &Work) -> Self {
        RevisionRecord {
            reviewer_id: Reviewer::Employee(child.employee_id),
            reviewer_name: child.employee_name.clone(),
            review_type: ReviewType::Revize,
            comment: child.description.clone(),
            revision_date: child.start_time,
            status: child.status.into(),
        }
    }
}
