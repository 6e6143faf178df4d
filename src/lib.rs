pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod observability;

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info};

use crate::{
    application::usecases::plan_assignment::PlanAssignmentUseCase,
    domain::value_objects::enums::plan_kinds::PlanKind,
    infrastructure::{
        axum_http::http_serve,
        postgres::{
            postgres_connection::{self, PgPoolSquad},
            repositories::{
                clients::ClientPostgres, plan_assignments::PlanAssignmentPostgres,
                plans::PlanPostgres,
            },
        },
    },
};

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    observability::init_observability("coaching-core")?;

    let dotenvy_env = config::config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = Arc::new(postgres_connection::establish_connection(
        &dotenvy_env.database.url,
    )?);
    info!("Postgres connection has been established");

    if dotenvy_env.maintenance.migrate_legacy_plans_on_startup {
        migrate_legacy_plans(Arc::clone(&postgres_pool)).await;
    }

    http_serve::start(Arc::new(dotenvy_env), postgres_pool).await?;

    Ok(())
}

/// Failures are logged and startup continues.
async fn migrate_legacy_plans(db_pool: Arc<PgPoolSquad>) {
    let usecase = PlanAssignmentUseCase::new(
        Arc::new(ClientPostgres::new(Arc::clone(&db_pool))),
        Arc::new(PlanPostgres::new(Arc::clone(&db_pool))),
        Arc::new(PlanAssignmentPostgres::new(db_pool)),
    );

    for kind in [PlanKind::Diet, PlanKind::Workout] {
        match usecase.migrate_legacy_assignments(kind).await {
            Ok(report) => info!(
                %kind,
                migrated = report.migrated,
                cleared = report.cleared,
                "plans: legacy assignments migrated on startup"
            ),
            Err(err) => error!(%kind, error = ?err, "plans: legacy migration failed on startup"),
        }
    }
}
