use anyhow::{Result, anyhow};
use futures_util::StreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;

use crate::error::StoreError;
use crate::store::AttendanceStore;

/// Cached list of known teacher names.
///
/// Attendance validation and the roster view read it on every request;
/// teacher mutations call [`TeacherDirectory::invalidate`].
#[derive(Clone)]
pub struct TeacherDirectory {
    cache: Cache<(), Arc<Vec<String>>>,
}

impl TeacherDirectory {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    pub async fn names<S: AttendanceStore>(&self, store: &S) -> Result<Arc<Vec<String>>, StoreError> {
        if let Some(names) = self.cache.get(&()).await {
            return Ok(names);
        }
        let names = Arc::new(store.teacher_names().await?);
        self.cache.insert((), names.clone()).await;
        Ok(names)
    }

    pub async fn prime(&self, names: Vec<String>) {
        self.cache.insert((), Arc::new(names)).await;
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }
}

/// Load the teacher roster into the directory using a streamed query
pub async fn warmup_teacher_directory(
    directory: &TeacherDirectory,
    pool: &MySqlPool,
    capacity_hint: usize,
) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>(
        "SELECT name FROM teachers WHERE name <> '' ORDER BY name",
    )
    .fetch(pool);

    let mut names = Vec::with_capacity(capacity_hint);

    while let Some(row) = stream.next().await {
        let (name,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;
        names.push(name);
    }

    let total = names.len();
    directory.prime(names).await;

    log::info!("Teacher directory warmup complete: {} teachers", total);
    Ok(())
}
