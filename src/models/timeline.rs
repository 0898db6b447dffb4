use chrono::{NaiveDate, Timelike};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;

use crate::{
    calendar::{self, WORK_END_HOUR, WORK_START_HOUR},
    database::{Store, WorkQuery},
    error::AppError,
};

use super::{employee::Employee, work::Work};

#[derive(Debug, Serialize)]
pub struct TimelineSlot {
    pub hour: u32,
    pub works: Vec<Work>,
}

/// Works of one employee on one day, one slot per office hour from 09 to
/// 18. The 18 slot is always empty since the office closes at 18:00.
pub async fn daily_timeline(
    store: &dyn Store,
    employee_id: &ObjectId,
    date: NaiveDate,
) -> Result<Vec<TimelineSlot>, AppError> {
    let employee = Employee::find_by_id(store, employee_id).await?;
    if employee.is_hidden_on(date) {
        return Ok(Vec::new());
    }

    let works = Work::find_many(
        store,
        &WorkQuery {
            employee_id: Some(employee.id),
            started_between: Some((
                calendar::from_local(calendar::at_hour(date, WORK_START_HOUR)),
                calendar::from_local(calendar::at_hour(date, WORK_END_HOUR)),
            )),
            ..Default::default()
        },
    )
    .await?;

    Ok(bucket(works))
}

fn bucket(works: Vec<Work>) -> Vec<TimelineSlot> {
    let mut slots: Vec<TimelineSlot> = (WORK_START_HOUR..=WORK_END_HOUR)
        .map(|hour| TimelineSlot {
            hour,
            works: Vec::new(),
        })
        .collect();

    for work in works {
        let hour = calendar::to_local(work.start_time).hour();
        if (WORK_START_HOUR..WORK_END_HOUR).contains(&hour) {
            slots[(hour - WORK_START_HOUR) as usize].works.push(work);
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::testing::{local, FixedClock};
    use crate::database::memory::MemoryStore;
    use crate::models::work::{testing::*, WorkType};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[actix_web::test]
    async fn buckets_works_by_start_hour() {
        let store = MemoryStore::default();
        let ayse = employee("Ayşe");
        store.insert_employee(&ayse).await.unwrap();
        let morning = work(&ayse, WorkType::Video, local(2024, 6, 3, 9, 15));
        let afternoon = work(&ayse, WorkType::Software, local(2024, 6, 3, 14, 58));
        let next_day = work(&ayse, WorkType::Software, local(2024, 6, 4, 10, 0));
        let evening = work(&ayse, WorkType::Software, local(2024, 6, 3, 18, 30));
        for item in [&morning, &afternoon, &next_day, &evening] {
            store.insert_work(item).await.unwrap();
        }

        let slots = daily_timeline(&store, &ayse.id, day(3)).await.unwrap();

        assert_eq!(slots.len(), 10);
        assert_eq!(slots[0].hour, 9);
        assert_eq!(slots[9].hour, 18);
        for slot in &slots {
            let ids: Vec<_> = slot.works.iter().map(|work| work.id).collect();
            match slot.hour {
                9 => assert_eq!(ids, vec![morning.id]),
                14 => assert_eq!(ids, vec![afternoon.id]),
                _ => assert!(ids.is_empty(), "slot {} should be empty", slot.hour),
            }
        }
    }

    #[actix_web::test]
    async fn other_employees_do_not_leak_in() {
        let store = MemoryStore::default();
        let ayse = employee("Ayşe");
        let ali = employee("Ali");
        store.insert_employee(&ayse).await.unwrap();
        store.insert_employee(&ali).await.unwrap();
        store
            .insert_work(&work(&ali, WorkType::Video, local(2024, 6, 3, 10, 0)))
            .await
            .unwrap();

        let slots = daily_timeline(&store, &ayse.id, day(3)).await.unwrap();
        assert!(slots.iter().all(|slot| slot.works.is_empty()));
    }

    #[actix_web::test]
    async fn deleted_employee_has_no_timeline_after_deletion_day() {
        let store = MemoryStore::default();
        let ayse = employee("Ayşe");
        store.insert_employee(&ayse).await.unwrap();
        store
            .insert_work(&work(&ayse, WorkType::Video, local(2024, 6, 3, 9, 30)))
            .await
            .unwrap();
        Employee::soft_delete(&store, &FixedClock(local(2024, 6, 3, 10, 0)), &ayse.id)
            .await
            .unwrap();

        assert!(daily_timeline(&store, &ayse.id, day(4)).await.unwrap().is_empty());
        let same_day = daily_timeline(&store, &ayse.id, day(3)).await.unwrap();
        assert_eq!(same_day[0].works.len(), 1);
    }

    #[actix_web::test]
    async fn unknown_employee_is_not_found() {
        let store = MemoryStore::default();
        let error = daily_timeline(&store, &ObjectId::new(), day(3))
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::NotFound { .. }));
    }
}
