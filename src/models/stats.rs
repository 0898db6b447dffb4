use mongodb::bson::oid::ObjectId;
use serde::Serialize;

use crate::{
    calendar,
    database::{Store, WorkQuery},
    duration,
    error::AppError,
};

use super::work::{ProgressStatus, Work, WorkType};

/// Average billable time per kind of finished work. An average is empty
/// when the employee has no such work.
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkStats {
    pub average_video_duration: String,
    pub average_software_duration: String,
    pub average_revision_duration: String,
    pub total_works: usize,
}

#[derive(Default)]
struct Bucket {
    count: i64,
    minutes: i64,
}

impl Bucket {
    fn add(&mut self, minutes: i64) {
        self.count += 1;
        self.minutes += minutes;
    }
    fn average(&self) -> String {
        if self.count == 0 {
            return String::new();
        }
        duration::format_minutes(self.minutes / self.count)
    }
}

impl WorkStats {
    pub async fn for_employee(
        store: &dyn Store,
        employee_id: &ObjectId,
    ) -> Result<WorkStats, AppError> {
        let works = Work::find_many(
            store,
            &WorkQuery {
                employee_id: Some(*employee_id),
                status: Some(ProgressStatus::Completed),
                ..Default::default()
            },
        )
        .await?;
        Ok(WorkStats::from_works(&works))
    }

    /// Billable minutes are recomputed here; the stored `durationMinutes`
    /// is wall-clock and stays untouched.
    pub fn from_works(works: &[Work]) -> WorkStats {
        let (mut video, mut software, mut revision) =
            (Bucket::default(), Bucket::default(), Bucket::default());

        for work in works {
            let Some(end_time) = work.end_time else {
                continue;
            };
            let (start, end) = (calendar::to_local(work.start_time), calendar::to_local(end_time));
            if calendar::is_weekend(start.date()) || calendar::is_weekend(end.date()) {
                continue;
            }
            let minutes = duration::billable_minutes(start, end);
            match work.work_type {
                WorkType::Video => video.add(minutes),
                WorkType::Software => software.add(minutes),
                WorkType::Revize => revision.add(minutes),
                WorkType::Review => (),
            }
        }

        WorkStats {
            average_video_duration: video.average(),
            average_software_duration: software.average(),
            average_revision_duration: revision.average(),
            total_works: (video.count + software.count + revision.count) as usize,
        }
    }
}
