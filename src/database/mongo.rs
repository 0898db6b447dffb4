use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures::{Future, TryStreamExt};
use mongodb::{
    bson::{self, doc, oid::ObjectId, to_document, Bson, Document},
    options::{ClientOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};
use serde::{
    de::{value::StrDeserializer, DeserializeOwned, IntoDeserializer},
    Deserialize, Deserializer, Serialize,
};
use std::time::Duration;

use super::{RevisionStatusFilter, Store, StoreError, WorkQuery};
use crate::models::{
    employee::{Employee, EmployeeType},
    review::{RecordStatus, Review, RevisionRecord, ReviewType, Reviewer},
    work::{ProgressStatus, ReviewStatus, RevisionStatus, Work, WorkType},
};

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

const EMPLOYEES: &str = "employees";
const WORKS: &str = "works";

/// Instant the zero `time.Time` of older rows maps to.
const ZERO_TIME_MILLIS: i64 = -62_135_596_800_000;

pub async fn connect(uri: &str, db_name: &str) -> Result<MongoStore, StoreError> {
    let setup = async {
        let mut options = ClientOptions::parse(uri).await?;
        options.server_selection_timeout = Some(OPERATION_TIMEOUT);
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());

        let client = Client::with_options(options)?;
        let db = client.database(db_name);
        db.run_command(doc! { "ping": 1 }, None).await?;

        let works = db.collection::<WorkDocument>(WORKS);
        works
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "reviewedVideoId": 1 })
                    .options(IndexOptions::builder().sparse(true).build())
                    .build(),
                None,
            )
            .await?;
        works
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "employeeId": 1, "startTime": 1 })
                    .build(),
                None,
            )
            .await?;
        Ok::<_, StoreError>(db)
    };

    let db = tokio::time::timeout(CONNECT_TIMEOUT, setup)
        .await
        .map_err(|_| StoreError::Timeout)??;
    Ok(MongoStore::new(db))
}

#[derive(Clone)]
pub struct MongoStore {
    db: Database,
    deadline: Duration,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        MongoStore {
            db,
            deadline: OPERATION_TIMEOUT,
        }
    }
    fn employees(&self) -> Collection<EmployeeDocument> {
        self.db.collection::<EmployeeDocument>(EMPLOYEES)
    }
    fn works(&self) -> Collection<WorkDocument> {
        self.db.collection::<WorkDocument>(WORKS)
    }
    async fn within<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.deadline, operation)
            .await
            .map_err(|_| StoreError::Timeout)?
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        let document = EmployeeDocument::from(employee);
        self.within(async {
            self.employees().insert_one(&document, None).await?;
            Ok(())
        })
        .await
    }
    async fn find_employee(&self, id: &ObjectId) -> Result<Option<Employee>, StoreError> {
        self.within(async {
            let found = self.employees().find_one(doc! { "_id": id }, None).await?;
            found.map(Employee::try_from).transpose()
        })
        .await
    }
    async fn find_employees(&self, include_deleted: bool) -> Result<Vec<Employee>, StoreError> {
        let filter = if include_deleted {
            doc! {}
        } else {
            doc! { "deletedAt": { "$exists": false } }
        };
        self.within(async {
            let cursor = self.employees().find(filter, None).await?;
            let documents: Vec<EmployeeDocument> = cursor.try_collect().await?;
            documents.into_iter().map(Employee::try_from).collect()
        })
        .await
    }
    async fn soft_delete_employee(
        &self,
        id: &ObjectId,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.within(async {
            let result = self
                .employees()
                .update_one(
                    doc! { "_id": id, "deletedAt": { "$exists": false } },
                    doc! { "$set": { "deletedAt": to_bson_date(at) } },
                    None,
                )
                .await?;
            if result.matched_count > 0 {
                return Ok(true);
            }
            // already deleted, or never existed
            let existing = self
                .employees()
                .count_documents(doc! { "_id": id }, None)
                .await?;
            Ok(existing > 0)
        })
        .await
    }

    async fn insert_work(&self, work: &Work) -> Result<(), StoreError> {
        let document = WorkDocument::from(work);
        self.within(async {
            self.works().insert_one(&document, None).await?;
            Ok(())
        })
        .await
    }
    async fn find_work(&self, id: &ObjectId) -> Result<Option<Work>, StoreError> {
        self.within(async {
            let found = self.works().find_one(doc! { "_id": id }, None).await?;
            found.map(Work::try_from).transpose()
        })
        .await
    }
    async fn find_works(&self, query: &WorkQuery) -> Result<Vec<Work>, StoreError> {
        let filter = work_filter(query);
        self.within(async {
            let cursor = self.works().find(filter, None).await?;
            let documents: Vec<WorkDocument> = cursor.try_collect().await?;
            documents.into_iter().map(Work::try_from).collect()
        })
        .await
    }
    async fn replace_work(&self, work: &Work, expected_version: i64) -> Result<bool, StoreError> {
        let mut filter = doc! { "_id": work.id };
        if expected_version == 0 {
            filter.insert(
                "$or",
                vec![
                    doc! { "version": 0_i64 },
                    doc! { "version": { "$exists": false } },
                ],
            );
        } else {
            filter.insert("version", expected_version);
        }

        let mut document = to_document(&WorkDocument::from(work))
            .map_err(|error| StoreError::Document(error.to_string()))?;
        document.remove("_id");
        let unset = cleared_fields(&document);

        let mut update = doc! { "$set": document };
        if !unset.is_empty() {
            update.insert("$unset", unset);
        }

        self.within(async {
            let result = self.works().update_one(filter, update, None).await?;
            Ok(result.matched_count == 1)
        })
        .await
    }
}

/// Optional fields absent from the serialized work; a full replace must
/// remove them from the stored row as well.
fn cleared_fields(document: &Document) -> Document {
    const OPTIONAL: [&str; 11] = [
        "videoLink",
        "reviewedVideoId",
        "originalVideoId",
        "revisedBy",
        "revisedByName",
        "endTime",
        "duration",
        "durationMinutes",
        "workStatus",
        "revisionStatus",
        "revisionNote",
    ];
    let mut unset = Document::new();
    for field in OPTIONAL {
        if !document.contains_key(field) {
            unset.insert(field, "");
        }
    }
    unset
}

fn work_filter(query: &WorkQuery) -> Document {
    let mut filter = doc! {};
    if let Some(id) = query.employee_id {
        filter.insert("employeeId", id);
    }
    if let Some(work_type) = query.work_type {
        filter.insert("workType", work_type.as_str());
    }
    if let Some(status) = query.status {
        filter.insert("status", status.as_str());
    }
    match &query.revision_status {
        Some(RevisionStatusFilter::Is(status)) => {
            filter.insert("revisionStatus", status.as_str());
        }
        Some(RevisionStatusFilter::Not(status)) => {
            filter.insert("revisionStatus", doc! { "$nin": [status.as_str()] });
        }
        None => (),
    }
    if let Some(id) = query.reviewed_video_id {
        filter.insert("reviewedVideoId", id);
    }
    if let Some((from, to)) = query.started_between {
        filter.insert(
            "startTime",
            doc! { "$gte": to_bson_date(from), "$lte": to_bson_date(to) },
        );
    }
    if let Some((from, to)) = query.ended_between {
        filter.insert(
            "endTime",
            doc! { "$gte": to_bson_date(from), "$lte": to_bson_date(to) },
        );
    }
    if query.has_reviews {
        filter.insert("reviews", doc! { "$exists": true, "$ne": [] });
    }
    filter
}

fn to_bson_date(instant: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(instant.timestamp_millis())
}

fn from_bson_date(date: bson::DateTime) -> Result<DateTime<Utc>, StoreError> {
    Utc.timestamp_millis_opt(date.timestamp_millis())
        .single()
        .ok_or_else(|| StoreError::Document(format!("instant out of range: {date}")))
}

/// Older rows store `""` where no value was chosen.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => {
            let value: StrDeserializer<'_, D::Error> = raw.as_str().into_deserializer();
            T::deserialize(value).map(Some)
        }
    }
}

/// Older rows store `null` for an empty list.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmployeeDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    #[serde(rename = "type")]
    kind: EmployeeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deleted_at: Option<bson::DateTime>,
}

impl From<&Employee> for EmployeeDocument {
    fn from(employee: &Employee) -> Self {
        EmployeeDocument {
            id: employee.id,
            name: employee.name.clone(),
            kind: employee.kind,
            deleted_at: employee.deleted_at.map(to_bson_date),
        }
    }
}
impl TryFrom<EmployeeDocument> for Employee {
    type Error = StoreError;

    fn try_from(document: EmployeeDocument) -> Result<Self, Self::Error> {
        Ok(Employee {
            id: document.id,
            name: document.name,
            kind: document.kind,
            deleted_at: document.deleted_at.map(from_bson_date).transpose()?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewDocument {
    reviewer_id: String,
    #[serde(default)]
    reviewer_name: String,
    #[serde(default)]
    comment: String,
    created_at: bson::DateTime,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RevisionRecordDocument {
    reviewer_id: String,
    #[serde(default)]
    reviewer_name: String,
    review_type: ReviewType,
    #[serde(default)]
    comment: String,
    revision_date: bson::DateTime,
    status: RecordStatus,
}

fn parse_reviewer(raw: &str) -> Result<Reviewer, StoreError> {
    raw.parse().map_err(StoreError::Document)
}

impl From<&Review> for ReviewDocument {
    fn from(review: &Review) -> Self {
        ReviewDocument {
            reviewer_id: review.reviewer_id.to_string(),
            reviewer_name: review.reviewer_name.clone(),
            comment: review.comment.clone(),
            created_at: to_bson_date(review.created_at),
        }
    }
}
impl TryFrom<ReviewDocument> for Review {
    type Error = StoreError;

    fn try_from(document: ReviewDocument) -> Result<Self, Self::Error> {
        Ok(Review {
            reviewer_id: parse_reviewer(&document.reviewer_id)?,
            reviewer_name: document.reviewer_name,
            comment: document.comment,
            created_at: from_bson_date(document.created_at)?,
        })
    }
}

impl From<&RevisionRecord> for RevisionRecordDocument {
    fn from(record: &RevisionRecord) -> Self {
        RevisionRecordDocument {
            reviewer_id: record.reviewer_id.to_string(),
            reviewer_name: record.reviewer_name.clone(),
            review_type: record.review_type,
            comment: record.comment.clone(),
            revision_date: to_bson_date(record.revision_date),
            status: record.status,
        }
    }
}
impl TryFrom<RevisionRecordDocument> for RevisionRecord {
    type Error = StoreError;

    fn try_from(document: RevisionRecordDocument) -> Result<Self, Self::Error> {
        Ok(RevisionRecord {
            reviewer_id: parse_reviewer(&document.reviewer_id)?,
            reviewer_name: document.reviewer_name,
            review_type: document.review_type,
            comment: document.comment,
            revision_date: from_bson_date(document.revision_date)?,
            status: document.status,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    employee_id: ObjectId,
    #[serde(default)]
    employee_name: String,
    work_type: WorkType,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "blank_as_none")]
    video_link: Option<String>,
    #[serde(default)]
    is_first_video: bool,
    #[serde(default)]
    is_revision: bool,
    #[serde(default)]
    is_reviewed: bool,
    #[serde(default)]
    is_revision_completed: bool,
    #[serde(default)]
    is_being_reviewed: bool,
    #[serde(default)]
    needs_employee_review: bool,
    #[serde(default)]
    needs_admin_review: bool,
    #[serde(default)]
    admin_reviewed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reviewed_video_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_video_id: Option<ObjectId>,
    /// An ObjectId on older rows, `"admin"` or a hex string otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    revised_by: Option<Bson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    revised_by_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    reviews: Vec<ReviewDocument>,
    start_time: bson::DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_time: Option<bson::DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration_minutes: Option<i64>,
    status: ProgressStatus,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "blank_as_none")]
    work_status: Option<ReviewStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "blank_as_none")]
    revision_status: Option<RevisionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "blank_as_none")]
    revision_note: Option<String>,
    #[serde(default)]
    revision_count: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    revision_history: Vec<RevisionRecordDocument>,
    #[serde(default)]
    review_cycle: u32,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "blank_as_none")]
    last_review_type: Option<ReviewType>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "blank_as_none")]
    last_reviewer_type: Option<ReviewType>,
    #[serde(default)]
    version: i64,
}

impl From<&Work> for WorkDocument {
    fn from(work: &Work) -> Self {
        WorkDocument {
            id: work.id,
            employee_id: work.employee_id,
            employee_name: work.employee_name.clone(),
            work_type: work.work_type,
            description: work.description.clone(),
            video_link: work.video_link.clone(),
            is_first_video: work.is_first_video,
            is_revision: work.is_revision,
            is_reviewed: work.is_reviewed,
            is_revision_completed: work.is_revision_completed,
            is_being_reviewed: work.is_being_reviewed,
            needs_employee_review: work.needs_employee_review,
            needs_admin_review: work.needs_admin_review,
            admin_reviewed: work.admin_reviewed,
            reviewed_video_id: work.reviewed_video_id,
            original_video_id: work.original_video_id,
            revised_by: work.revised_by.as_ref().map(|reviewer| match reviewer {
                Reviewer::Admin => Bson::String(reviewer.to_string()),
                Reviewer::Employee(id) => Bson::ObjectId(*id),
            }),
            revised_by_name: work.revised_by_name.clone(),
            reviews: work.reviews.iter().map(ReviewDocument::from).collect(),
            start_time: to_bson_date(work.start_time),
            end_time: work.end_time.map(to_bson_date),
            duration: work.duration.clone(),
            duration_minutes: work.duration_minutes,
            status: work.status,
            work_status: work.work_status,
            revision_status: work.revision_status,
            revision_note: work.revision_note.clone(),
            revision_count: work.revision_count,
            revision_history: work
                .revision_history
                .iter()
                .map(RevisionRecordDocument::from)
                .collect(),
            review_cycle: work.review_cycle,
            last_review_type: work.last_review_type,
            last_reviewer_type: work.last_reviewer_type,
            version: work.version,
        }
    }
}

impl TryFrom<WorkDocument> for Work {
    type Error = StoreError;

    fn try_from(document: WorkDocument) -> Result<Self, Self::Error> {
        let revised_by = match document.revised_by {
            None | Some(Bson::Null) => None,
            Some(Bson::ObjectId(id)) => Some(Reviewer::Employee(id)),
            Some(Bson::String(raw)) => Some(parse_reviewer(&raw)?),
            Some(other) => {
                return Err(StoreError::Document(format!(
                    "unexpected revisedBy value: {other}"
                )))
            }
        };
        let end_time = document
            .end_time
            .filter(|date| date.timestamp_millis() != ZERO_TIME_MILLIS)
            .map(from_bson_date)
            .transpose()?;

        Ok(Work {
            id: document.id,
            employee_id: document.employee_id,
            employee_name: document.employee_name,
            work_type: document.work_type,
            description: document.description,
            video_link: document.video_link,
            is_first_video: document.is_first_video,
            is_revision: document.is_revision,
            is_reviewed: document.is_reviewed,
            is_revision_completed: document.is_revision_completed,
            is_being_reviewed: document.is_being_reviewed,
            needs_employee_review: document.needs_employee_review,
            needs_admin_review: document.needs_admin_review,
            admin_reviewed: document.admin_reviewed,
            reviewed_video_id: document.reviewed_video_id,
            original_video_id: document.original_video_id,
            revised_by,
            revised_by_name: document.revised_by_name,
            reviews: document
                .reviews
                .into_iter()
                .map(Review::try_from)
                .collect::<Result<_, _>>()?,
            start_time: from_bson_date(document.start_time)?,
            end_time,
            duration: document.duration,
            duration_minutes: document.duration_minutes,
            status: document.status,
            work_status: document.work_status,
            revision_status: document.revision_status,
            revision_note: document.revision_note,
            revision_count: document.revision_count,
            revision_history: document
                .revision_history
                .into_iter()
                .map(RevisionRecord::try_from)
                .collect::<Result<_, _>>()?,
            review_cycle: document.review_cycle,
            last_review_type: document.last_review_type,
            last_reviewer_type: document.last_reviewer_type,
            version: document.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::testing::local;
    use crate::models::work::testing::{completed, employee, work};

    #[test]
    fn renders_query_as_filter() {
        let employee_id = ObjectId::new();
        let filter = work_filter(&WorkQuery {
            employee_id: Some(employee_id),
            work_type: Some(WorkType::Video),
            status: Some(ProgressStatus::Completed),
            revision_status: Some(RevisionStatusFilter::Not(RevisionStatus::Approved)),
            has_reviews: true,
            ..Default::default()
        });

        assert_eq!(filter.get_object_id("employeeId").unwrap(), employee_id);
        assert_eq!(filter.get_str("workType").unwrap(), "video");
        assert_eq!(filter.get_str("status").unwrap(), "completed");
        assert_eq!(
            filter.get_document("revisionStatus").unwrap(),
            &doc! { "$nin": ["approved"] }
        );
        assert!(filter.get_document("reviews").is_ok());
        assert!(!filter.contains_key("startTime"));
    }

    #[test]
    fn work_survives_document_conversion() {
        let mut video = completed(
            work(&employee("Ayşe"), WorkType::Video, local(2024, 6, 3, 9, 15)),
            local(2024, 6, 3, 11, 0),
        );
        video.reviews = vec![Review::admin("Ses seviyesi", local(2024, 6, 3, 12, 0))];
        video.revised_by = Some(Reviewer::Admin);
        video.version = 4;

        let document = to_document(&WorkDocument::from(&video)).unwrap();
        assert_eq!(document.get_str("workType").unwrap(), "video");
        assert_eq!(document.get_str("workStatus").unwrap(), "pending_review");
        assert!(!document.contains_key("revisionStatus"));

        let decoded: WorkDocument = bson::from_document(document).unwrap();
        assert_eq!(Work::try_from(decoded).unwrap(), video);
    }

    #[test]
    fn decodes_rows_written_by_older_builds() {
        let employee_id = ObjectId::new();
        let parent = ObjectId::new();
        let row = doc! {
            "_id": ObjectId::new(),
            "employeeId": employee_id,
            "employeeName": "Ali",
            "workType": "software",
            "description": "",
            "videoLink": "",
            "revisedBy": parent,
            "reviews": Bson::Null,
            "startTime": bson::DateTime::from_millis(1_717_405_200_000),
            "endTime": bson::DateTime::from_millis(ZERO_TIME_MILLIS),
            "status": "in_progress",
            "workStatus": "",
            "lastReviewType": "",
            "revisionCount": 0_i32,
            "revisionHistory": Bson::Null,
        };

        let decoded: WorkDocument = bson::from_document(row).unwrap();
        let work = Work::try_from(decoded).unwrap();
        assert!(work.video_link.is_none());
        assert!(work.work_status.is_none());
        assert!(work.last_review_type.is_none());
        assert!(work.end_time.is_none());
        assert!(work.reviews.is_empty());
        assert_eq!(work.revised_by, Some(Reviewer::Employee(parent)));
        assert_eq!(work.version, 0);
    }

    #[test]
    fn replace_unsets_cleared_fields() {
        let video = work(&employee("Ayşe"), WorkType::Video, local(2024, 6, 3, 9, 15));
        let document = to_document(&WorkDocument::from(&video)).unwrap();
        let unset = cleared_fields(&document);
        assert!(unset.contains_key("endTime"));
        assert!(unset.contains_key("revisionNote"));
        assert!(!unset.contains_key("workStatus"));
    }
}
