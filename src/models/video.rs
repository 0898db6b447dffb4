//! Video lists shown on the admin console.

use chrono::NaiveDate;

use crate::{
    calendar,
    database::{RevisionStatusFilter, Store, WorkQuery},
    error::AppError,
    messages,
};

use super::{
    review::RevisionRecord,
    work::{ProgressStatus, RevisionStatus, Work, WorkType},
};

fn finished_videos() -> WorkQuery {
    WorkQuery {
        work_type: Some(WorkType::Video),
        status: Some(ProgressStatus::Completed),
        ..Default::default()
    }
}

impl Work {
    pub async fn find_approved_videos(store: &dyn Store) -> Result<Vec<Work>, AppError> {
        let query = WorkQuery {
            revision_status: Some(RevisionStatusFilter::Is(RevisionStatus::Approved)),
            ..finished_videos()
        };
        Work::find_many(store, &query)
            .await
            .map_err(|error| error.on_store(messages::APPROVED_VIDEOS_LOAD_FAILED))
    }

    /// Finished videos still waiting for a decision, optionally only those
    /// finished on `date`. Each carries its revize works as extra history
    /// entries.
    pub async fn find_awaiting_review(
        store: &dyn Store,
        date: Option<NaiveDate>,
    ) -> Result<Vec<Work>, AppError> {
        let query = WorkQuery {
            revision_status: Some(RevisionStatusFilter::Not(RevisionStatus::Approved)),
            ended_between: date.map(|date| {
                (
                    calendar::from_local(calendar::start_of_day(date)),
                    calendar::from_local(calendar::end_of_day(date)),
                )
            }),
            ..finished_videos()
        };
        let mut videos = Work::find_many(store, &query)
            .await
            .map_err(|error| error.on_store(messages::COMPLETED_VIDEOS_LOAD_FAILED))?;

        for video in videos.iter_mut() {
            let revisions = Work::find_many(
                store,
                &WorkQuery {
                    work_type: Some(WorkType::Revize),
                    reviewed_video_id: Some(video.id),
                    ..Default::default()
                },
            )
            .await
            .map_err(|error| error.on_store(messages::COMPLETED_VIDEOS_LOAD_FAILED))?;

            video
                .revision_history
                .extend(revisions.iter().map(RevisionRecord::from_revize));
        }
        Ok(videos)
    }

    pub async fn find_reviewed_videos(store: &dyn Store) -> Result<Vec<Work>, AppError> {
        let query = WorkQuery {
            has_reviews: true,
            ..finished_videos()
        };
        Work::find_many(store, &query)
            .await
            .map_err(|error| error.on_store(messages::REVIEWED_VIDEOS_LOAD_FAILED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::testing::local;
    use crate::database::memory::MemoryStore;
    use crate::models::{
        review::{RecordStatus, Review, ReviewType, Reviewer},
        work::testing::*,
    };

    #[actix_web::test]
    async fn lists_by_revision_status() {
        let store = MemoryStore::default();
        let ayse = employee("Ayşe");

        let mut approved = completed(
            work(&ayse, WorkType::Video, local(2024, 6, 3, 9, 0)),
            local(2024, 6, 3, 10, 0),
        );
        approved.revision_status = Some(RevisionStatus::Approved);
        let waiting = completed(
            work(&ayse, WorkType::Video, local(2024, 6, 3, 11, 0)),
            local(2024, 6, 3, 11, 30),
        );
        let running = work(&ayse, WorkType::Video, local(2024, 6, 3, 14, 0));
        let software = completed(
            work(&ayse, WorkType::Software, local(2024, 6, 3, 9, 0)),
            local(2024, 6, 3, 10, 0),
        );
        for item in [&approved, &waiting, &running, &software] {
            store.insert_work(item).await.unwrap();
        }

        let ids = |works: Vec<Work>| works.into_iter().map(|work| work.id).collect::<Vec<_>>();
        assert_eq!(
            ids(Work::find_approved_videos(&store).await.unwrap()),
            vec![approved.id]
        );
        assert_eq!(
            ids(Work::find_awaiting_review(&store, None).await.unwrap()),
            vec![waiting.id]
        );
    }

    #[actix_web::test]
    async fn awaiting_review_filters_by_finish_day() {
        let store = MemoryStore::default();
        let ayse = employee("Ayşe");
        let monday = completed(
            work(&ayse, WorkType::Video, local(2024, 6, 3, 9, 0)),
            local(2024, 6, 3, 17, 0),
        );
        let tuesday = completed(
            work(&ayse, WorkType::Video, local(2024, 6, 3, 16, 0)),
            local(2024, 6, 4, 9, 30),
        );
        store.insert_work(&monday).await.unwrap();
        store.insert_work(&tuesday).await.unwrap();

        let found = Work::find_awaiting_review(&store, NaiveDate::from_ymd_opt(2024, 6, 4))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, tuesday.id);
    }

    #[actix_web::test]
    async fn awaiting_review_appends_revize_history() {
        let store = MemoryStore::default();
        let ayse = employee("Ayşe");
        let ali = employee("Ali");

        let mut video = completed(
            work(&ayse, WorkType::Video, local(2024, 6, 3, 9, 0)),
            local(2024, 6, 3, 10, 0),
        );
        video.revision_status = Some(RevisionStatus::NeedsRevision);
        video.revision_count = 1;
        video.revision_history = vec![RevisionRecord::admin(
            RecordStatus::NeedsRevision,
            "Ses seviyesi",
            local(2024, 6, 3, 11, 0),
        )];
        store.insert_work(&video).await.unwrap();

        let mut revize = work(&ali, WorkType::Revize, local(2024, 6, 3, 13, 0));
        revize.reviewed_video_id = Some(video.id);
        revize.description = "Ses düzeltildi".to_string();
        store.insert_work(&revize).await.unwrap();

        let found = Work::find_awaiting_review(&store, None).await.unwrap();
        let history = &found[0].revision_history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].review_type, ReviewType::Admin);
        assert_eq!(history[1].review_type, ReviewType::Revize);
        assert_eq!(history[1].reviewer_id, Reviewer::Employee(ali.id));
        assert_eq!(history[1].comment, "Ses düzeltildi");
        assert_eq!(history[1].status, RecordStatus::InProgress);

        // the stored row is untouched
        let stored = store.find_work(&video.id).await.unwrap().unwrap();
        assert_eq!(stored.revision_history.len(), 1);
    }

    #[actix_web::test]
    async fn reviewed_videos_have_reviews() {
        let store = MemoryStore::default();
        let ayse = employee("Ayşe");
        let mut reviewed = completed(
            work(&ayse, WorkType::Video, local(2024, 6, 3, 9, 0)),
            local(2024, 6, 3, 10, 0),
        );
        reviewed.reviews = vec![Review::admin("Renkler soluk", local(2024, 6, 3, 11, 0))];
        let plain = completed(
            work(&ayse, WorkType::Video, local(2024, 6, 3, 9, 0)),
            local(2024, 6, 3, 10, 0),
        );
        store.insert_work(&reviewed).await.unwrap();
        store.insert_work(&plain).await.unwrap();

        let found = Work::find_reviewed_videos(&store).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, reviewed.id);
    }
}
