//! Admin dashboard loader.
//!
//! Fetches `/admin/stats` and `/admin/activities` concurrently and publishes
//! the pair through a [`Lifecycle`]. If either request fails the whole load
//! fails, and consumers render [`Dashboard::default`] (zeros, no activity).

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio::sync::watch;
use tracing::warn;

use crate::gateway::Gateway;
use crate::lifecycle::Lifecycle;
use crate::models::{string_or_number, LoadState};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_vendors: u64,
    pub total_products: u64,
    pub total_sales: f64,
    pub pending_vendor_approvals: u64,
    pub low_stock_alerts: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentActivity {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub user: String,
}

impl RecentActivity {
    /// `YYYY-MM-DD` for RFC 3339 timestamps, the raw value otherwise.
    pub fn display_date(&self) -> String {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| self.timestamp.clone())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub activities: Vec<RecentActivity>,
}

/// One tile of the stats grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
}

impl Dashboard {
    pub fn stat_cards(&self) -> Vec<StatCard> {
        let s = &self.stats;
        vec![
            card("Total Users", s.total_users.to_string()),
            card("Total Vendors", s.total_vendors.to_string()),
            card("Total Products", s.total_products.to_string()),
            card("Total Sales", format!("${}", s.total_sales)),
            card("Pending Approvals", s.pending_vendor_approvals.to_string()),
            card("Low Stock Alerts", s.low_stock_alerts.to_string()),
        ]
    }
}

fn card(title: &'static str, value: String) -> StatCard {
    StatCard { title, value }
}

pub struct DashboardLoader {
    gateway: Gateway,
    lifecycle: Lifecycle<Dashboard>,
}

impl DashboardLoader {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            lifecycle: Lifecycle::new(),
        }
    }

    /// Load stats and activities. The load begins (and supersedes earlier
    /// ones) when this is called; the future resolves to `true` if its
    /// outcome was applied.
    pub fn load(&self) -> impl Future<Output = bool> + Send + '_ {
        let ticket = self.lifecycle.begin();
        async move {
            let Some(ticket) = ticket else {
                return false;
            };

            let outcome =
                tokio::try_join!(self.gateway.admin_stats(), self.gateway.admin_activities())
                    .map(|(stats, activities)| Dashboard { stats, activities })
                    .map_err(|e| {
                        warn!(error = %e, "failed to load dashboard data");
                        format!("failed to load dashboard data: {}", e)
                    });

            self.lifecycle.settle(ticket, outcome)
        }
    }

    pub fn teardown(&self) {
        self.lifecycle.teardown();
    }

    pub fn state(&self) -> LoadState<Dashboard> {
        self.lifecycle.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState<Dashboard>> {
        self.lifecycle.subscribe()
    }

    /// Loaded data, or the zeroed default while pending or after a failure.
    pub fn visible(&self) -> Dashboard {
        self.state().ready().cloned().unwrap_or_default()
    }
}
