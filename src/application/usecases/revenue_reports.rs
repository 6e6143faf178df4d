use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    application::{revenue_calculator::RevenueCalculator, usecases::is_store_unavailable},
    domain::{
        entities::{clients::ClientEntity, packages::PackageEntity},
        repositories::{clients::ClientRepository, packages::PackageRepository},
        value_objects::{
            clients::ListClientsFilter,
            enums::client_statuses::ClientStatus,
            iam::Actor,
            revenue::{
                MonthlyRevenueDto, RevenueOverviewDto, RevenueQuery, RevenueReportDto,
                RevenueTrendsDto, TargetMonth,
            },
        },
    },
};

pub const DEFAULT_MAX_TREND_MONTHS: u32 = 24;

#[derive(Debug, Error)]
pub enum RevenueReportError {
    #[error("{0}")]
    BadRequest(String),
    #[error("not allowed to {0}")]
    Forbidden(&'static str),
    #[error("store unavailable")]
    StoreUnavailable(#[source] anyhow::Error),
    #[error(transparent)]
    Internal(anyhow::Error),
}

impl RevenueReportError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            RevenueReportError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RevenueReportError::Forbidden(_) => StatusCode::FORBIDDEN,
            RevenueReportError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            RevenueReportError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn from_store(err: anyhow::Error) -> Self {
        if is_store_unavailable(&err) {
            RevenueReportError::StoreUnavailable(err)
        } else {
            RevenueReportError::Internal(err)
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, RevenueReportError>;

pub struct RevenueReportUseCase<C, K>
where
    C: ClientRepository + Send + Sync + 'static,
    K: PackageRepository + Send + Sync + 'static,
{
    client_repo: Arc<C>,
    package_repo: Arc<K>,
    max_trend_months: u32,
}

impl<C, K> RevenueReportUseCase<C, K>
where
    C: ClientRepository + Send + Sync + 'static,
    K: PackageRepository + Send + Sync + 'static,
{
    pub fn new(client_repo: Arc<C>, package_repo: Arc<K>, max_trend_months: u32) -> Self {
        Self {
            client_repo,
            package_repo,
            max_trend_months: max_trend_months.max(1),
        }
    }

    /// `?from=&to=` selects a trend report, otherwise a single month
    /// (`?month=`, defaulting to the month containing `now`).
    pub async fn revenue_report(
        &self,
        query: RevenueQuery,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> UseCaseResult<RevenueReportDto> {
        ensure_admin(actor)?;
        match (query.from.as_deref(), query.to.as_deref()) {
            (Some(from), Some(to)) => {
                let from = parse_month("from", from)?;
                let to = parse_month("to", to)?;
                self.revenue_trends(from, to).await.map(RevenueReportDto::Trends)
            }
            (None, None) => {
                let month = match query.month.as_deref() {
                    Some(raw) => parse_month("month", raw)?,
                    None => TargetMonth::containing(now),
                };
                self.monthly_revenue(month).await.map(RevenueReportDto::Monthly)
            }
            _ => Err(RevenueReportError::BadRequest(
                "from and to must be given together".to_string(),
            )),
        }
    }

    pub async fn monthly_revenue(&self, month: TargetMonth) -> UseCaseResult<MonthlyRevenueDto> {
        let (clients, packages) = self.load_active_book().await?;
        let revenue = RevenueCalculator::new(&packages).monthly_revenue(&clients, month);
        info!(%month, revenue, client_count = clients.len(), "reports: monthly revenue computed");

        Ok(MonthlyRevenueDto {
            month,
            revenue: round_revenue(revenue),
        })
    }

    pub async fn revenue_trends(
        &self,
        from: TargetMonth,
        to: TargetMonth,
    ) -> UseCaseResult<RevenueTrendsDto> {
        if from > to {
            return Err(RevenueReportError::BadRequest(format!(
                "from ({from}) must not be after to ({to})"
            )));
        }
        let months = from.through(to);
        if months.len() > self.max_trend_months as usize {
            warn!(%from, %to, max = self.max_trend_months, "reports: trend range too long");
            return Err(RevenueReportError::BadRequest(format!(
                "trend range is limited to {} months",
                self.max_trend_months
            )));
        }

        let (clients, packages) = self.load_active_book().await?;
        let calculator = RevenueCalculator::new(&packages);
        let trends = months
            .into_iter()
            .map(|month| MonthlyRevenueDto {
                month,
                revenue: round_revenue(calculator.monthly_revenue(&clients, month)),
            })
            .collect::<Vec<_>>();
        info!(%from, %to, months = trends.len(), "reports: revenue trends computed");

        Ok(RevenueTrendsDto { trends })
    }

    pub async fn overview(&self, actor: Actor, now: DateTime<Utc>) -> UseCaseResult<RevenueOverviewDto> {
        ensure_admin(actor)?;
        let clients = self.load_clients(ListClientsFilter::default()).await?;
        let packages = self.load_packages().await?;

        let month = TargetMonth::containing(now);
        let previous = month.previous();
        let calculator = RevenueCalculator::new(&packages);
        let revenue = round_revenue(calculator.monthly_revenue(&clients, month));
        let previous_month_revenue = round_revenue(calculator.monthly_revenue(&clients, previous));

        let count = |status: ClientStatus| clients.iter().filter(|c| c.status == status).count();

        Ok(RevenueOverviewDto {
            month,
            revenue,
            previous_month_revenue,
            growth_percent: growth_percent(revenue, previous_month_revenue),
            active_clients: count(ClientStatus::Active),
            inactive_clients: count(ClientStatus::Inactive),
            enquired_clients: count(ClientStatus::Enquired),
        })
    }

    async fn load_active_book(&self) -> UseCaseResult<(Vec<ClientEntity>, Vec<PackageEntity>)> {
        let clients = self
            .load_clients(ListClientsFilter {
                status: Some(ClientStatus::Active),
                trainer_id: None,
            })
            .await?;
        let packages = self.load_packages().await?;
        Ok((clients, packages))
    }

    async fn load_clients(&self, filter: ListClientsFilter) -> UseCaseResult<Vec<ClientEntity>> {
        self.client_repo.find_all(filter).await.map_err(|err| {
            error!(db_error = ?err, "reports: failed to load clients");
            RevenueReportError::from_store(err)
        })
    }

    async fn load_packages(&self) -> UseCaseResult<Vec<PackageEntity>> {
        self.package_repo.find_all().await.map_err(|err| {
            error!(db_error = ?err, "reports: failed to load packages");
            RevenueReportError::from_store(err)
        })
    }
}

fn ensure_admin(actor: Actor) -> UseCaseResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        warn!(actor_id = %actor.user_id, role = %actor.role, "reports: access denied");
        Err(RevenueReportError::Forbidden("view revenue reports"))
    }
}

fn parse_month(field: &str, raw: &str) -> UseCaseResult<TargetMonth> {
    TargetMonth::parse(raw)
        .map_err(|err| RevenueReportError::BadRequest(format!("invalid {field}: {err}")))
}

fn round_revenue(revenue: f64) -> i64 {
    revenue.round() as i64
}

/// Percent change to two decimals; `None` when there is nothing to compare with.
fn growth_percent(current: i64, previous: i64) -> Option<f64> {
    if previous == 0 {
        return None;
    }
    let growth = (current - previous) as f64 / previous as f64 * 100.0;
    Some((growth * 100.0).round() / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            entities::clients::SubscriptionWindow,
            errors::StoreError,
            repositories::{clients::MockClientRepository, packages::MockPackageRepository},
            value_objects::{
                document_id::DocumentId, enums::user_roles::UserRole, packages::PackageFeatures,
            },
        },
        infrastructure::in_memory::InMemoryStore,
    };
    use chrono::TimeZone;

    fn id(raw: &str) -> DocumentId {
        DocumentId::parse(raw).unwrap()
    }

    fn admin() -> Actor {
        Actor::new(id("65a0000000000000000000a1"), UserRole::Admin)
    }

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    fn month(raw: &str) -> TargetMonth {
        TargetMonth::parse(raw).unwrap()
    }

    fn client(
        raw_id: &str,
        status: ClientStatus,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ClientEntity {
        ClientEntity {
            id: id(raw_id),
            name: "Meera".to_string(),
            email: "meera@example.com".to_string(),
            package_id: Some(id("65a000000000000000000e01")),
            trainer_id: None,
            package_duration: Some(4),
            status,
            subscription: SubscriptionWindow {
                start_date: Some(start),
                end_date: Some(end),
                renewal_count: 0,
                last_renewed_at: None,
            },
            created_at: Some(start),
        }
    }

    fn january_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.seed_package(PackageEntity {
            id: id("65a000000000000000000e01"),
            name: "Package A".to_string(),
            price: 2500.0,
            features: PackageFeatures::default(),
            live_sessions_per_month: 4,
            is_active: true,
        });
        store.seed_client(client(
            "65a000000000000000000c01",
            ClientStatus::Active,
            at(2024, 1, 1),
            at(2024, 1, 29),
        ));
        store.seed_client(client(
            "65a000000000000000000c02",
            ClientStatus::Active,
            at(2024, 2, 1),
            at(2024, 3, 1),
        ));
        store.seed_client(client(
            "65a000000000000000000c03",
            ClientStatus::Inactive,
            at(2024, 1, 1),
            at(2024, 1, 29),
        ));
        store.seed_client(client(
            "65a000000000000000000c04",
            ClientStatus::Enquired,
            at(2024, 1, 1),
            at(2024, 1, 29),
        ));
        store
    }

    fn usecase(store: &InMemoryStore) -> RevenueReportUseCase<InMemoryStore, InMemoryStore> {
        RevenueReportUseCase::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            DEFAULT_MAX_TREND_MONTHS,
        )
    }

    #[tokio::test]
    async fn january_report_counts_only_the_overlapping_client() {
        let usecase = usecase(&january_store());

        let report = usecase.monthly_revenue(month("2024-01")).await.unwrap();
        assert_eq!(report.month, month("2024-01"));
        assert_eq!(report.revenue, 2500);
    }

    #[tokio::test]
    async fn report_query_picks_single_month_or_trends() {
        let usecase = usecase(&january_store());
        let now = at(2024, 1, 20);

        let single = usecase
            .revenue_report(RevenueQuery::default(), admin(), now)
            .await
            .unwrap();
        assert_eq!(
            single,
            RevenueReportDto::Monthly(MonthlyRevenueDto {
                month: month("2024-01"),
                revenue: 2500,
            })
        );

        let trends = usecase
            .revenue_report(
                RevenueQuery {
                    month: None,
                    from: Some("2023-12".to_string()),
                    to: Some("2024-02".to_string()),
                },
                admin(),
                now,
            )
            .await
            .unwrap();
        let RevenueReportDto::Trends(trends) = trends else {
            panic!("expected a trend report");
        };
        let revenues: Vec<(String, i64)> = trends
            .trends
            .iter()
            .map(|t| (t.month.to_string(), t.revenue))
            .collect();
        // February has 29 days in 2024; the client runs through 1 March 00:00.
        assert_eq!(
            revenues,
            vec![
                ("2023-12".to_string(), 0),
                ("2024-01".to_string(), 2500),
                ("2024-02".to_string(), 2500),
            ]
        );

        let err = usecase
            .revenue_report(
                RevenueQuery {
                    month: None,
                    from: Some("2024-01".to_string()),
                    to: None,
                },
                admin(),
                now,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RevenueReportError::BadRequest(_)));
    }

    #[tokio::test]
    async fn malformed_months_are_bad_requests() {
        let usecase = usecase(&january_store());

        for raw in ["2024-13", "2024/01", "January"] {
            let err = usecase
                .revenue_report(
                    RevenueQuery {
                        month: Some(raw.to_string()),
                        from: None,
                        to: None,
                    },
                    admin(),
                    at(2024, 1, 1),
                )
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn trend_range_is_bounded_and_ordered() {
        let store = january_store();
        let usecase = RevenueReportUseCase::new(Arc::new(store.clone()), Arc::new(store), 3);

        let err = usecase
            .revenue_trends(month("2024-03"), month("2024-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, RevenueReportError::BadRequest(_)));

        let err = usecase
            .revenue_trends(month("2024-01"), month("2024-04"))
            .await
            .unwrap_err();
        assert!(matches!(err, RevenueReportError::BadRequest(_)));

        let ok = usecase
            .revenue_trends(month("2024-01"), month("2024-03"))
            .await
            .unwrap();
        assert_eq!(ok.trends.len(), 3);
    }

    #[tokio::test]
    async fn overview_compares_with_the_previous_month() {
        let usecase = usecase(&january_store());

        let overview = usecase.overview(admin(), at(2024, 2, 10)).await.unwrap();
        assert_eq!(overview.month, month("2024-02"));
        assert_eq!(overview.revenue, 2500);
        assert_eq!(overview.previous_month_revenue, 2500);
        assert_eq!(overview.growth_percent, Some(0.0));
        assert_eq!(
            (overview.active_clients, overview.inactive_clients, overview.enquired_clients),
            (2, 1, 1)
        );

        let overview = usecase.overview(admin(), at(2024, 1, 10)).await.unwrap();
        assert_eq!(overview.previous_month_revenue, 0);
        assert_eq!(overview.growth_percent, None);
    }

    #[tokio::test]
    async fn reports_are_admin_only() {
        let usecase = usecase(&january_store());
        let trainer = Actor::new(id("65a0000000000000000000b1"), UserRole::Trainer);

        let err = usecase
            .revenue_report(RevenueQuery::default(), trainer, at(2024, 1, 1))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
        assert!(usecase.overview(trainer, at(2024, 1, 1)).await.is_err());
    }

    #[tokio::test]
    async fn store_outage_fails_the_whole_report() {
        let mut client_repo = MockClientRepository::new();
        let mut package_repo = MockPackageRepository::new();
        client_repo.expect_find_all().returning(|_| Ok(Vec::new()));
        package_repo
            .expect_find_all()
            .returning(|| Err(StoreError::Unavailable("pool timed out".into()).into()));

        let usecase = RevenueReportUseCase::new(
            Arc::new(client_repo),
            Arc::new(package_repo),
            DEFAULT_MAX_TREND_MONTHS,
        );
        let err = usecase
            .revenue_trends(month("2024-01"), month("2024-06"))
            .await
            .unwrap_err();
        assert!(matches!(err, RevenueReportError::StoreUnavailable(_)));
    }

    #[test]
    fn growth_is_rounded_to_two_decimals() {
        assert_eq!(growth_percent(1500, 1000), Some(50.0));
        assert_eq!(growth_percent(1000, 3000), Some(-66.67));
        assert_eq!(growth_percent(10, 0), None);
    }
}
