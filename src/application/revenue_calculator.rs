//! Monthly revenue attribution.
//!
//! Every client pays a flat package price for a window of `package_duration`
//! weeks. A month is credited with the share of that price whose window falls
//! inside the month, measured in calendar days divided by seven.

use std::collections::HashMap;

use chrono::Duration;

use crate::domain::{
    entities::{clients::ClientEntity, packages::PackageEntity},
    value_objects::{
        document_id::DocumentId, enums::client_statuses::ClientStatus, revenue::TargetMonth,
    },
};

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const DAYS_PER_WEEK: f64 = 7.0;

/// Holds the id -> package index so a trends report resolves packages once
/// for all months instead of once per client per month. Archived packages are
/// left out of the index.
pub struct RevenueCalculator<'a> {
    packages: HashMap<DocumentId, &'a PackageEntity>,
}

impl<'a> RevenueCalculator<'a> {
    pub fn new(packages: &'a [PackageEntity]) -> Self {
        Self {
            packages: packages
                .iter()
                .filter(|package| package.is_active)
                .map(|package| (package.id, package))
                .collect(),
        }
    }

    pub fn monthly_revenue(&self, clients: &[ClientEntity], month: TargetMonth) -> f64 {
        clients
            .iter()
            .map(|client| self.client_contribution(client, month))
            .sum()
    }

    /// Revenue one client contributes to `month`. Never negative.
    pub fn client_contribution(&self, client: &ClientEntity, month: TargetMonth) -> f64 {
        if client.status != ClientStatus::Active {
            return 0.0;
        }
        let Some(package_id) = client.package_id else {
            return 0.0;
        };
        // Deleted or archived packages no longer resolve.
        let Some(package) = self.packages.get(&package_id) else {
            return 0.0;
        };
        if !package.price.is_finite() || package.price <= 0.0 {
            return 0.0;
        }
        let Some(start) = client.subscription.start_date.or(client.created_at) else {
            return 0.0;
        };

        let duration_weeks = client.package_duration_weeks();
        // A duration too long to place on the calendar earns nothing.
        let Some(end) = client.subscription.end_date.or_else(|| {
            Duration::try_weeks(duration_weeks as i64)
                .and_then(|length| start.checked_add_signed(length))
        }) else {
            return 0.0;
        };

        let month_start = month.start();
        let month_end = month.end();
        if start > month_end || end < month_start {
            return 0.0;
        }

        let overlap_ms = (end.min(month_end) - start.max(month_start)).num_milliseconds();
        if overlap_ms <= 0 {
            return 0.0;
        }

        let overlap_weeks = overlap_ms as f64 / MILLIS_PER_DAY / DAYS_PER_WEEK;
        let duration_weeks = duration_weeks as f64;
        if overlap_weeks >= duration_weeks {
            package.price
        } else {
            package.price * overlap_weeks / duration_weeks
        }
    }
}

/// Unrounded revenue attributable to `month`; callers round for display.
pub fn calculate_monthly_revenue(
    clients: &[ClientEntity],
    packages: &[PackageEntity],
    month: TargetMonth,
) -> f64 {
    RevenueCalculator::new(packages).monthly_revenue(clients, month)
}
