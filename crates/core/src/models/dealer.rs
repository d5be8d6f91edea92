use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Dealer {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub address: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A dealer ready to be persisted; the password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDealer {
    pub name: String,
    pub username: String,
    pub address: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterDealerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Public view of a dealer. Never carries the credential hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealerResponse {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl From<Dealer> for DealerResponse {
    fn from(dealer: Dealer) -> Self {
        Self {
            id: dealer.id,
            name: dealer.name,
            username: dealer.username,
            address: dealer.address,
            created_at: dealer.created_at,
        }
    }
}
