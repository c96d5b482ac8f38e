use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Completed,
    Expired,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Completed => "completed",
            RequestStatus::Expired => "expired",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScaleRequest {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub professional_id: Uuid,
    pub scale_id: Uuid,
    pub scale_code: String,
    pub status: RequestStatus,
    pub requested_at: jiff::Timestamp,
    /// Stored for future use; requests never expire on their own.
    pub expires_at: Option<jiff::Timestamp>,
    pub notes: Option<String>,
    #[serde(default)]
    pub deleted_at: Option<jiff::Timestamp>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl ScaleRequest {
    pub fn new(
        patient_id: Uuid,
        professional_id: Uuid,
        scale_id: Uuid,
        scale_code: impl Into<String>,
        notes: Option<String>,
        now: jiff::Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            professional_id,
            scale_id,
            scale_code: scale_code.into(),
            status: RequestStatus::Pending,
            requested_at: now,
            expires_at: None,
            notes,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Expiry is disabled: a request is never expired by elapsed time.
    pub fn expired_by_time(&self) -> bool {
        false
    }

    pub fn can_be_completed(&self) -> bool {
        self.is_pending() && !self.expired_by_time()
    }

    pub fn complete(&mut self, now: jiff::Timestamp) -> bool {
        self.transition(RequestStatus::Completed, now)
    }

    pub fn cancel(&mut self, now: jiff::Timestamp) -> bool {
        self.transition(RequestStatus::Cancelled, now)
    }

    pub fn expire(&mut self, now: jiff::Timestamp) -> bool {
        self.transition(RequestStatus::Expired, now)
    }

    // Only pending requests move; everything else is terminal.
    fn transition(&mut self, to: RequestStatus, now: jiff::Timestamp) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.status = to;
        self.updated_at = now;
        true
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn soft_delete(&mut self, now: jiff::Timestamp) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }
}
