use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::{
    domain::value_objects::{document_id::DocumentId, packages::PackageFeatures},
    infrastructure::postgres::schema::packages,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PackageEntity {
    pub id: DocumentId,
    pub name: String,
    pub price: f64,
    pub features: PackageFeatures,
    pub live_sessions_per_month: i32,
    pub is_active: bool,
}

/// Raw row used for Diesel queries. Features stay as JSON and are parsed into PackageFeatures.
#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = packages)]
pub struct PackageRow {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub features: serde_json::Value,
    pub live_sessions_per_month: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<PackageRow> for PackageEntity {
    type Error = anyhow::Error;

    fn try_from(value: PackageRow) -> Result<Self> {
        let features = serde_json::from_value(value.features).unwrap_or_default();

        Ok(Self {
            id: DocumentId::parse(&value.id).context("stored package id")?,
            name: value.name,
            price: value.price,
            features,
            live_sessions_per_month: value.live_sessions_per_month,
            is_active: value.is_active,
        })
    }
}
