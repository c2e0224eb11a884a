use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Profile row owned by the identity-provider sync. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Opaque id issued by the identity provider.
    pub external_id: String,
    pub email: String,
    pub industry: String,
    pub created_at: DateTime<Utc>,
}
