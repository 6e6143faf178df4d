use std::str::FromStr;

use anyhow::{Context, Result};

use crate::{
    application::usecases::revenue_reports::DEFAULT_MAX_TREND_MONTHS,
    config::{
        config_model::{Auth, Database, DotEnvyConfig, Maintenance, Reports, Server},
        stage::Stage,
    },
};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BODY_LIMIT_MIB: u64 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let stage = get_stage();

    // Production must spell out its server settings.
    let server = if stage == Stage::Production {
        Server {
            port: required_parsed("SERVER_PORT")?,
            body_limit: required_parsed("SERVER_BODY_LIMIT")?,
            timeout: required_parsed("SERVER_TIMEOUT")?,
        }
    } else {
        Server {
            port: optional_parsed("SERVER_PORT")?.unwrap_or(DEFAULT_PORT),
            body_limit: optional_parsed("SERVER_BODY_LIMIT")?.unwrap_or(DEFAULT_BODY_LIMIT_MIB),
            timeout: optional_parsed("SERVER_TIMEOUT")?.unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let auth = Auth {
        jwt_secret: get_auth_secret()?,
    };

    let reports = Reports {
        max_trend_months: optional_parsed("REPORT_MAX_TREND_MONTHS")?
            .unwrap_or(DEFAULT_MAX_TREND_MONTHS),
    };

    let maintenance = Maintenance {
        migrate_legacy_plans_on_startup: optional_parsed("MIGRATE_LEGACY_PLANS_ON_STARTUP")?
            .unwrap_or(false),
    };

    Ok(DotEnvyConfig {
        stage,
        server,
        database,
        auth,
        reports,
        maintenance,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or_default();
    Stage::try_from(stage_str.as_str()).unwrap_or_default()
}

/// Secret used to verify bearer tokens; read on every verification.
pub fn get_auth_secret() -> Result<String> {
    dotenvy::dotenv().ok();

    required("JWT_SECRET")
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} is invalid"))
}

fn required_parsed<T>(name: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(name)?
        .trim()
        .parse()
        .with_context(|| format!("{name} is invalid"))
}

fn optional_parsed<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} is invalid")),
        _ => Ok(None),
    }
}
