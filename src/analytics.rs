use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Local, Months, NaiveDate, Utc};
use serde::Serialize;

use crate::db::{with_retry, Database, RetryPolicy};
use crate::error::ApiError;
use crate::models::{AnalyticsSnapshot, Order, OrderStatus};

/// The three branches, in the order the dashboard charts expect.
pub const LOCATIONS: [&str; 3] = ["rooftop", "medina", "casa"];

/// Statuses shown in the order-status chart, in fixed order. `ready` and
/// `cancelled` are intentionally not part of this breakdown.
const STATUS_BREAKDOWN: [OrderStatus; 4] = [
    OrderStatus::Completed,
    OrderStatus::Preparing,
    OrderStatus::Pending,
    OrderStatus::OutForDelivery,
];

/// Reporting window. A missing query value means `today`; anything
/// unrecognized falls through to `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Week,
    Month,
    All,
}

impl Period {
    pub fn parse(raw: Option<&str>) -> Period {
        match raw {
            None | Some("today") => Period::Today,
            Some("week") => Period::Week,
            Some("month") => Period::Month,
            _ => Period::All,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub metrics: Metrics,
    pub charts: Charts,
    pub popular_items: Vec<PopularItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_revenue: f64,
    pub total_orders: usize,
    pub avg_order: f64,
    pub active_orders: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    pub sales_trend: SalesTrend,
    pub location_performance: Vec<u64>,
    pub order_status: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesTrend {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularItem {
    pub name: String,
    pub orders: u64,
    pub revenue: f64,
    /// Placeholder with no data backing it; stays absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_growth_percent: Option<f64>,
}

/// Snapshot entry flattened for the popular-items ranking endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedItem {
    pub name: String,
    pub count: u64,
    pub total_revenue: f64,
}

/// Fold one order-creation event into the running snapshot. Incremental
/// updates and from-scratch replays share this step so they cannot diverge.
pub fn apply_order(snapshot: &mut AnalyticsSnapshot, order: &Order) {
    snapshot.total_orders += 1;
    snapshot.total_revenue += order.total;

    if !order.location.is_empty() {
        *snapshot
            .orders_by_location
            .entry(order.location.clone())
            .or_insert(0) += 1;
    }

    for item in &order.items {
        let stats = snapshot.popular_items.entry(item.name.clone()).or_default();
        stats.count += 1;
        stats.total_revenue += item.price;
    }

    if let Some(day) = utc_day(&order.timestamp) {
        *snapshot.orders_by_day.entry(day).or_insert(0) += 1;
    }
}

/// Rebuild the snapshot from scratch by folding over the full order list in
/// creation order. Must agree with the incrementally maintained snapshot.
pub fn replay(orders: &[Order]) -> AnalyticsSnapshot {
    let mut snapshot = AnalyticsSnapshot::default();
    for order in orders {
        apply_order(&mut snapshot, order);
    }
    snapshot
}

/// Maintains the persisted snapshot document and serves reads of it.
#[derive(Clone)]
pub struct AnalyticsEngine {
    db: Arc<Database>,
    retry: RetryPolicy,
}

impl AnalyticsEngine {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            retry: RetryPolicy::default(),
        }
    }

    pub fn snapshot(&self) -> Result<AnalyticsSnapshot, ApiError> {
        let conn = self
            .db
            .conn
            .lock()
            .map_err(|_| ApiError::StoreRead("analytics"))?;
        read_snapshot(&conn)
    }

    /// Apply one created order to the persisted snapshot. The whole
    /// read-modify-write cycle runs under a single lock acquisition so
    /// concurrent creates cannot lose updates.
    pub fn record_order(&self, order: &Order) -> Result<(), ApiError> {
        let conn = self
            .db
            .conn
            .lock()
            .map_err(|_| ApiError::StoreWrite("analytics"))?;

        let mut snapshot = read_snapshot(&conn)?;
        apply_order(&mut snapshot, order);

        let raw = serde_json::to_string(&snapshot).map_err(|err| {
            tracing::error!(error = %err, "failed to serialize analytics snapshot");
            ApiError::StoreWrite("analytics")
        })?;
        with_retry(&self.retry, || {
            conn.execute("UPDATE analytics SET snapshot = ?1 WHERE id = 1", [&raw])
        })
        .map_err(|err| {
            tracing::error!(error = %err, "failed to write analytics snapshot");
            ApiError::StoreWrite("analytics")
        })?;

        Ok(())
    }

    /// All-time item ranking from the snapshot, most ordered first.
    pub fn popular_items(&self) -> Result<Vec<RankedItem>, ApiError> {
        let snapshot = self.snapshot()?;
        let mut items: Vec<RankedItem> = snapshot
            .popular_items
            .into_iter()
            .map(|(name, stats)| RankedItem {
                name,
                count: stats.count,
                total_revenue: stats.total_revenue,
            })
            .collect();
        items.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(items)
    }
}

fn read_snapshot(conn: &rusqlite::Connection) -> Result<AnalyticsSnapshot, ApiError> {
    let raw: String = conn
        .query_row("SELECT snapshot FROM analytics WHERE id = 1", [], |row| {
            row.get(0)
        })
        .map_err(|err| {
            tracing::error!(error = %err, "failed to read analytics snapshot");
            ApiError::StoreRead("analytics")
        })?;
    serde_json::from_str(&raw).map_err(|err| {
        tracing::error!(error = %err, "failed to parse analytics snapshot");
        ApiError::StoreRead("analytics")
    })
}

/// Period-scoped report, recomputed fresh from the full order list (never
/// from the snapshot). `active_orders` and the status breakdown always cover
/// the full list; everything else is scoped to the period.
pub fn report(orders: &[Order], period: Period, now: DateTime<Utc>) -> AnalyticsReport {
    let start = start_date(period, now);
    let in_scope: Vec<&Order> = orders
        .iter()
        .filter(|order| parse_timestamp(&order.timestamp).is_some_and(|ts| ts >= start))
        .collect();

    let total_revenue: f64 = in_scope.iter().map(|order| order.total).sum();
    let total_orders = in_scope.len();
    let avg_order = if total_orders > 0 {
        total_revenue / total_orders as f64
    } else {
        0.0
    };
    let active_orders = orders.iter().filter(|o| o.status.is_active()).count();

    // Trend buckets are keyed by full date; weekday labels are derived only
    // at serialization.
    let today = now.with_timezone(&Local).date_naive();
    let days: Vec<NaiveDate> = (0..7).rev().map(|i| today - Duration::days(i)).collect();
    let mut revenue_by_day: BTreeMap<NaiveDate, f64> =
        days.iter().map(|day| (*day, 0.0)).collect();
    for order in &in_scope {
        if let Some(ts) = parse_timestamp(&order.timestamp) {
            let day = ts.with_timezone(&Local).date_naive();
            if let Some(bucket) = revenue_by_day.get_mut(&day) {
                *bucket += order.total;
            }
        }
    }
    let sales_trend = SalesTrend {
        labels: days.iter().map(|day| day.format("%a").to_string()).collect(),
        data: days.iter().map(|day| revenue_by_day[day]).collect(),
    };

    let location_performance = LOCATIONS
        .iter()
        .map(|loc| in_scope.iter().filter(|o| o.location == *loc).count() as u64)
        .collect();

    let order_status = STATUS_BREAKDOWN
        .iter()
        .map(|status| orders.iter().filter(|o| o.status == *status).count() as u64)
        .collect();

    let mut item_counts: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
    for order in &in_scope {
        for item in &order.items {
            let entry = item_counts.entry(item.name.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += item.price;
        }
    }
    let mut popular_items: Vec<PopularItem> = item_counts
        .into_iter()
        .map(|(name, (orders, revenue))| PopularItem {
            name: name.to_string(),
            orders,
            revenue,
            estimated_growth_percent: None,
        })
        .collect();
    popular_items.sort_by(|a, b| b.orders.cmp(&a.orders));
    popular_items.truncate(5);

    AnalyticsReport {
        metrics: Metrics {
            total_revenue,
            total_orders,
            avg_order,
            active_orders,
        },
        charts: Charts {
            sales_trend,
            location_performance,
            order_status,
        },
        popular_items,
    }
}

fn start_date(period: Period, now: DateTime<Utc>) -> DateTime<Utc> {
    match period {
        Period::Today => now
            .with_timezone(&Local)
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
            .map(|midnight| midnight.with_timezone(&Utc))
            .unwrap_or(now),
        Period::Week => now - Duration::days(7),
        Period::Month => now.checked_sub_months(Months::new(1)).unwrap_or(now),
        Period::All => DateTime::UNIX_EPOCH,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

/// UTC calendar day (`YYYY-MM-DD`) of an order timestamp.
fn utc_day(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|ts| ts.date_naive().to_string())
}
