use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;

use super::AttendanceStore;
use crate::error::StoreError;
use crate::model::attendance::{AttendanceHistoryEntry, AttendanceRecord};

/// In-process store used by the service tests.
#[derive(Default)]
pub struct MemoryStore {
    teachers: RefCell<Vec<String>>,
    records: RefCell<BTreeMap<(String, NaiveDate), AttendanceRecord>>,
    failing: RefCell<HashSet<String>>,
    pub saves: Cell<usize>,
}

impl MemoryStore {
    pub fn with_teachers(names: &[&str]) -> Self {
        let store = MemoryStore::default();
        store
            .teachers
            .replace(names.iter().map(|n| n.to_string()).collect());
        store
    }

    pub fn seed(&self, record: AttendanceRecord) {
        self.records
            .borrow_mut()
            .insert((record.teacher.clone(), record.date), record);
    }

    /// Every later save for `teacher` fails.
    pub fn fail_for(&self, teacher: &str) {
        self.failing.borrow_mut().insert(teacher.to_string());
    }

    pub fn get(&self, teacher: &str, date: NaiveDate) -> Option<AttendanceRecord> {
        self.records
            .borrow()
            .get(&(teacher.to_string(), date))
            .cloned()
    }
}

impl AttendanceStore for MemoryStore {
    async fn teacher_names(&self) -> Result<Vec<String>, StoreError> {
        let mut names = self.teachers.borrow().clone();
        names.sort();
        Ok(names)
    }

    async fn attendance_on(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StoreError> {
        Ok(self
            .records
            .borrow()
            .values()
            .filter(|r| r.date == date)
            .cloned()
            .collect())
    }

    async fn save_attendance(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        if self.failing.borrow().contains(&record.teacher) {
            return Err(StoreError::Unavailable(format!(
                "write rejected for {}",
                record.teacher
            )));
        }
        self.saves.set(self.saves.get() + 1);
        self.seed(record.clone());
        Ok(())
    }

    async fn attendance_history(
        &self,
        teacher: &str,
    ) -> Result<Vec<AttendanceHistoryEntry>, StoreError> {
        Ok(self
            .records
            .borrow()
            .values()
            .filter(|r| r.teacher == teacher)
            .map(|r| AttendanceHistoryEntry {
                date: r.date,
                status: r.status,
            })
            .collect())
    }
}
