use serde::{Deserialize, Serialize};

use crate::domain::{entities::packages::PackageEntity, value_objects::document_id::DocumentId};

/// Feature flags attached to a package. Stored as JSONB in the database.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PackageFeatures {
    #[serde(default, rename = "videoAccess", alias = "video_access")]
    pub video_access: Option<bool>,

    #[serde(default, rename = "dietPlanAccess", alias = "diet_plan_access")]
    pub diet_plan_access: Option<bool>,

    #[serde(default, rename = "workoutPlanAccess", alias = "workout_plan_access")]
    pub workout_plan_access: Option<bool>,

    #[serde(
        default,
        rename = "liveGroupTrainingAccess",
        alias = "live_group_training_access"
    )]
    pub live_group_training_access: Option<bool>,

    #[serde(
        default,
        rename = "personalTrainingAccess",
        alias = "personal_training_access"
    )]
    pub personal_training_access: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PackageDto {
    pub id: DocumentId,
    pub name: String,
    pub price: f64,
    pub features: PackageFeatures,
    pub live_sessions_per_month: i32,
    pub is_active: bool,
}

impl From<PackageEntity> for PackageDto {
    fn from(value: PackageEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            price: value.price,
            features: value.features,
            live_sessions_per_month: value.live_sessions_per_month,
            is_active: value.is_active,
        }
    }
}
