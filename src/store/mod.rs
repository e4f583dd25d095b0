//! Record store access for the attendance component.
//!
//! The attendance service is written against [`AttendanceStore`] so it can be
//! driven by the MySQL pool in production and an in-memory store in tests.
//! The other record kinds talk to the pool directly from their handlers.

use chrono::NaiveDate;

use crate::error::StoreError;
use crate::model::attendance::{AttendanceHistoryEntry, AttendanceRecord};

#[cfg(test)]
pub mod memory;
pub mod mysql;

#[allow(async_fn_in_trait)]
pub trait AttendanceStore {
    /// Known teacher names, ascending.
    async fn teacher_names(&self) -> Result<Vec<String>, StoreError>;

    async fn attendance_on(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, StoreError>;

    /// Insert or overwrite the record keyed by `(teacher, date)`.
    async fn save_attendance(&self, record: &AttendanceRecord) -> Result<(), StoreError>;

    async fn attendance_history(
        &self,
        teacher: &str,
    ) -> Result<Vec<AttendanceHistoryEntry>, StoreError>;
}
