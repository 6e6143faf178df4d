use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::{
    domain::value_objects::{document_id::DocumentId, enums::client_statuses::ClientStatus},
    infrastructure::postgres::schema::clients,
};

/// Package length used when a client carries no (or a non-positive) duration.
pub const DEFAULT_PACKAGE_DURATION_WEEKS: i32 = 4;

/// Package lengths a client can be sold, in weeks.
pub const PACKAGE_DURATIONS_WEEKS: [i32; 3] = [4, 8, 12];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionWindow {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub renewal_count: i32,
    pub last_renewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientEntity {
    pub id: DocumentId,
    pub name: String,
    pub email: String,
    pub package_id: Option<DocumentId>,
    pub trainer_id: Option<DocumentId>,
    pub package_duration: Option<i32>,
    pub status: ClientStatus,
    pub subscription: SubscriptionWindow,
    pub created_at: Option<DateTime<Utc>>,
}

impl ClientEntity {
    pub fn package_duration_weeks(&self) -> i32 {
        match self.package_duration {
            Some(weeks) if weeks > 0 => weeks,
            _ => DEFAULT_PACKAGE_DURATION_WEEKS,
        }
    }
}

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = clients)]
pub struct ClientRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub package_id: Option<String>,
    pub trainer_id: Option<String>,
    pub package_duration: Option<i32>,
    pub status: String,
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub renewal_count: i32,
    pub last_renewed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ClientRow> for ClientEntity {
    type Error = anyhow::Error;

    fn try_from(value: ClientRow) -> Result<Self> {
        // Dangling package references are kept as None so the client still loads.
        let package_id = value
            .package_id
            .as_deref()
            .and_then(|raw| DocumentId::parse(raw).ok());
        let trainer_id = value
            .trainer_id
            .as_deref()
            .and_then(|raw| DocumentId::parse(raw).ok());

        Ok(Self {
            id: DocumentId::parse(&value.id).context("stored client id")?,
            name: value.name,
            email: value.email,
            package_id,
            trainer_id,
            package_duration: value.package_duration,
            status: ClientStatus::parse(&value.status).unwrap_or_default(),
            subscription: SubscriptionWindow {
                start_date: value.subscription_start_date,
                end_date: value.subscription_end_date,
                renewal_count: value.renewal_count,
                last_renewed_at: value.last_renewed_at,
            },
            created_at: value.created_at,
        })
    }
}

/// Column set written when a subscription is renewed.
#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = clients)]
pub struct SubscriptionRenewalEntity {
    pub subscription_start_date: Option<DateTime<Utc>>,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub package_id: Option<String>,
    pub package_duration: Option<i32>,
    pub status: String,
    pub last_renewed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}
