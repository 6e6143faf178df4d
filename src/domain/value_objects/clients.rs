use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::clients::{ClientEntity, DEFAULT_PACKAGE_DURATION_WEEKS, SubscriptionRenewalEntity},
    value_objects::{document_id::DocumentId, enums::client_statuses::ClientStatus},
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubscriptionDto {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub renewal_count: i32,
    pub last_renewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ClientDto {
    pub id: DocumentId,
    pub name: String,
    pub email: String,
    pub package_id: Option<DocumentId>,
    pub trainer_id: Option<DocumentId>,
    pub package_duration: i32,
    pub status: ClientStatus,
    pub subscription: SubscriptionDto,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ClientEntity> for ClientDto {
    fn from(value: ClientEntity) -> Self {
        Self {
            package_duration: value.package_duration_weeks(),
            id: value.id,
            name: value.name,
            email: value.email,
            package_id: value.package_id,
            trainer_id: value.trainer_id,
            status: value.status,
            subscription: SubscriptionDto {
                start_date: value.subscription.start_date,
                end_date: value.subscription.end_date,
                renewal_count: value.subscription.renewal_count,
                last_renewed_at: value.subscription.last_renewed_at,
            },
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListClientsFilter {
    pub status: Option<ClientStatus>,
    pub trainer_id: Option<DocumentId>,
}

/// Query string of `GET /clients`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListClientsQuery {
    pub status: Option<String>,
    #[serde(alias = "trainerId")]
    pub trainer_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewSubscriptionModel {
    #[serde(alias = "startDate")]
    pub start_date: DateTime<Utc>,
    #[serde(default, alias = "endDate")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, alias = "packageId")]
    pub package_id: Option<DocumentId>,
    #[serde(default, alias = "packageDuration")]
    pub package_duration: Option<i32>,
}

impl RenewSubscriptionModel {
    /// `current_duration` is the client's stored duration, used when the body
    /// does not carry a new one. Fails when the derived end date is not
    /// representable.
    pub fn to_entity(&self, current_duration: Option<i32>) -> Result<SubscriptionRenewalEntity> {
        let now = Utc::now();
        let weeks = match self.package_duration.or(current_duration) {
            Some(weeks) if weeks > 0 => weeks,
            _ => DEFAULT_PACKAGE_DURATION_WEEKS,
        };
        let end_date = match self.end_date {
            Some(end_date) => end_date,
            None => Duration::try_weeks(weeks as i64)
                .and_then(|length| self.start_date.checked_add_signed(length))
                .with_context(|| format!("subscription end out of range for {weeks} weeks"))?,
        };

        Ok(SubscriptionRenewalEntity {
            subscription_start_date: Some(self.start_date),
            subscription_end_date: Some(end_date),
            package_id: self.package_id.map(|id| id.to_string()),
            package_duration: self.package_duration,
            status: ClientStatus::Active.to_string(),
            last_renewed_at: Some(now),
            updated_at: now,
        })
    }
}
