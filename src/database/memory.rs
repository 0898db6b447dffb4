use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};
use tokio::sync::RwLock;

use super::{Store, StoreError, WorkQuery};
use crate::models::{employee::Employee, work::Work};

/// Store held in process memory, with the same matching and versioning
/// rules as the MongoDB binding.
#[derive(Default)]
pub struct MemoryStore {
    employees: RwLock<Vec<Employee>>,
    works: RwLock<Vec<Work>>,
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        self.employees.write().await.push(employee.clone());
        Ok(())
    }
    async fn find_employee(&self, id: &ObjectId) -> Result<Option<Employee>, StoreError> {
        let employees = self.employees.read().await;
        Ok(employees.iter().find(|employee| employee.id == *id).cloned())
    }
    async fn find_employees(&self, include_deleted: bool) -> Result<Vec<Employee>, StoreError> {
        let employees = self.employees.read().await;
        Ok(employees
            .iter()
            .filter(|employee| include_deleted || employee.deleted_at.is_none())
            .cloned()
            .collect())
    }
    async fn soft_delete_employee(
        &self,
        id: &ObjectId,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut employees = self.employees.write().await;
        match employees.iter_mut().find(|employee| employee.id == *id) {
            Some(employee) => {
                employee.deleted_at.get_or_insert(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_work(&self, work: &Work) -> Result<(), StoreError> {
        self.works.write().await.push(work.clone());
        Ok(())
    }
    async fn find_work(&self, id: &ObjectId) -> Result<Option<Work>, StoreError> {
        let works = self.works.read().await;
        Ok(works.iter().find(|work| work.id == *id).cloned())
    }
    async fn find_works(&self, query: &WorkQuery) -> Result<Vec<Work>, StoreError> {
        let works = self.works.read().await;
        Ok(works.iter().filter(|work| query.matches(work)).cloned().collect())
    }
    async fn replace_work(&self, work: &Work, expected_version: i64) -> Result<bool, StoreError> {
        let mut works = self.works.write().await;
        match works
            .iter_mut()
            .find(|stored| stored.id == work.id && stored.version == expected_version)
        {
            Some(stored) => {
                *stored = work.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// A [`MemoryStore`] whose conditional replaces can lose races on demand:
/// a queued write lands just before the next replace, or the replace is
/// refused outright.
pub struct ContendedStore {
    inner: MemoryStore,
    interleaved: Mutex<Vec<Work>>,
    refusals: AtomicUsize,
    replace_calls: AtomicUsize,
}

impl ContendedStore {
    pub fn new(inner: MemoryStore) -> Self {
        ContendedStore {
            inner,
            interleaved: Mutex::new(Vec::new()),
            refusals: AtomicUsize::new(0),
            replace_calls: AtomicUsize::new(0),
        }
    }

    /// Another request's result, written ahead of the next replace.
    pub fn interleave(self, work: Work) -> Self {
        self.interleaved.lock().unwrap().push(work);
        self
    }

    /// Refuses the next `count` replaces without writing.
    pub fn refusing(self, count: usize) -> Self {
        self.refusals.store(count, Ordering::SeqCst);
        self
    }

    pub fn replace_calls(&self) -> usize {
        self.replace_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for ContendedStore {
    async fn insert_employee(&self, employee: &Employee) -> Result<(), StoreError> {
        self.inner.insert_employee(employee).await
    }
    async fn find_employee(&self, id: &ObjectId) -> Result<Option<Employee>, StoreError> {
        self.inner.find_employee(id).await
    }
    async fn find_employees(&self, include_deleted: bool) -> Result<Vec<Employee>, StoreError> {
        self.inner.find_employees(include_deleted).await
    }
    async fn soft_delete_employee(
        &self,
        id: &ObjectId,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        self.inner.soft_delete_employee(id, at).await
    }

    async fn insert_work(&self, work: &Work) -> Result<(), StoreError> {
        self.inner.insert_work(work).await
    }
    async fn find_work(&self, id: &ObjectId) -> Result<Option<Work>, StoreError> {
        self.inner.find_work(id).await
    }
    async fn find_works(&self, query: &WorkQuery) -> Result<Vec<Work>, StoreError> {
        self.inner.find_works(query).await
    }
    async fn replace_work(&self, work: &Work, expected_version: i64) -> Result<bool, StoreError> {
        self.replace_calls.fetch_add(1, Ordering::SeqCst);
        let queued = self.interleaved.lock().unwrap().pop();
        if let Some(other) = queued {
            self.inner.replace_work(&other, other.version - 1).await?;
        }
        let refused = self
            .refusals
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if refused {
            return Ok(false);
        }
        self.inner.replace_work(work, expected_version).await
    }
}
