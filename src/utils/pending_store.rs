use moka::future::Cache;
use serde::Serialize;
use std::time::Duration;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::attendance::clock::ClockTime;
use crate::error::ValidationError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, Snapshot};

/// An overwrite of an existing record that waits for the operator's confirmation.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PendingOverwrite {
    #[schema(example = "4b3f3c1e-4f7e-4c7e-9d3c-2f1c8a7b6e5d")]
    pub token: String,
    pub proposed: AttendanceRecord,
    #[schema(value_type = Option<String>, example = "08:12")]
    pub previous_time: Option<ClockTime>,
    pub previous_status: AttendanceStatus,
}

/// Session-scoped confirmations, expiring after a TTL.
#[derive(Clone)]
pub struct PendingOverwrites {
    cache: Cache<Uuid, PendingOverwrite>,
}

impl PendingOverwrites {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn stage(&self, proposed: AttendanceRecord, previous: Snapshot) -> PendingOverwrite {
        let token = Uuid::new_v4();
        let pending = PendingOverwrite {
            token: token.to_string(),
            proposed,
            previous_time: previous.time,
            previous_status: previous.status,
        };
        self.cache.insert(token, pending.clone()).await;
        pending
    }

    /// Removes and returns the pending overwrite. `Ok(None)` when it expired or never existed.
    pub async fn take(&self, token: &str) -> Result<Option<PendingOverwrite>, ValidationError> {
        let key = Uuid::parse_str(token).map_err(|_| ValidationError::BadToken(token.to_string()))?;
        Ok(self.cache.remove(&key).await)
    }
}
