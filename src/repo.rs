use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::{with_retry, Database, RetryPolicy};
use crate::error::ApiError;
use crate::models::{CreateOrder, Order, OrderFilter, OrderItem, OrderStatus};

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Record-level access to the order store. All reads and writes go through
/// the shared connection lock, so writers are serialized per process.
#[derive(Clone)]
pub struct OrderStore {
    db: Arc<Database>,
    retry: RetryPolicy,
}

impl OrderStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            retry: RetryPolicy::default(),
        }
    }

    /// Validate the draft, assign id/status/timestamp server-side and insert
    /// the order with its line items in one transaction.
    pub fn create(&self, draft: CreateOrder) -> Result<Order, ApiError> {
        let (Some(items), Some(total), Some(customer)) = (draft.items, draft.total, draft.customer)
        else {
            return Err(ApiError::Validation(
                "Missing required fields: items, total, customer".to_string(),
            ));
        };

        let order = Order {
            id: Uuid::new_v4().to_string(),
            items,
            total,
            customer,
            location: draft.location.unwrap_or_else(|| "unknown".to_string()),
            status: OrderStatus::Pending,
            timestamp: now_rfc3339(),
            updated_at: None,
        };

        let mut conn = self
            .db
            .conn
            .lock()
            .map_err(|_| ApiError::StoreWrite("orders"))?;

        with_retry(&self.retry, || {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO orders (id, customer, location, total, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    order.id,
                    order.customer,
                    order.location,
                    order.total,
                    order.status,
                    order.timestamp
                ],
            )?;
            for item in &order.items {
                tx.execute(
                    "INSERT INTO order_items (order_id, name, price) VALUES (?1, ?2, ?3)",
                    params![order.id, item.name, item.price],
                )?;
            }
            tx.commit()
        })
        .map_err(|err| {
            tracing::error!(error = %err, "failed to insert order");
            ApiError::StoreWrite("orders")
        })?;

        Ok(order)
    }

    /// General listing: exact-match filters, then `limit` keeps the last N
    /// entries by insertion order, then the result is sorted newest first.
    /// Truncation happens before the sort.
    pub fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, ApiError> {
        let mut orders = self.all_in_insertion_order()?;

        if let Some(location) = &filter.location {
            orders.retain(|order| &order.location == location);
        }
        if let Some(status) = &filter.status {
            orders.retain(|order| order.status.as_str() == status.as_str());
        }
        if let Some(limit) = filter.limit {
            if limit > 0 && orders.len() > limit {
                orders.drain(..orders.len() - limit);
            }
        }

        orders.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(orders)
    }

    pub fn get(&self, id: &str) -> Result<Order, ApiError> {
        let conn = self
            .db
            .conn
            .lock()
            .map_err(|_| ApiError::StoreRead("orders"))?;

        let mut order = match conn.query_row(
            "SELECT id, customer, location, total, status, created_at, updated_at
             FROM orders WHERE id = ?1",
            [id],
            order_from_row,
        ) {
            Ok(order) => order,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Err(ApiError::NotFound),
            Err(err) => {
                tracing::error!(error = %err, "failed to read order");
                return Err(ApiError::StoreRead("orders"));
            }
        };

        order.items = load_items(&conn, &order.id).map_err(|err| {
            tracing::error!(error = %err, "failed to read order items");
            ApiError::StoreRead("orders")
        })?;

        Ok(order)
    }

    /// Set a new status and stamp `updated_at`. The caller has already
    /// checked the status is a recognized one.
    pub fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order, ApiError> {
        let now = now_rfc3339();
        {
            let conn = self
                .db
                .conn
                .lock()
                .map_err(|_| ApiError::StoreWrite("orders"))?;

            let changed = with_retry(&self.retry, || {
                conn.execute(
                    "UPDATE orders SET status = ?1, updated_at = ?2 WHERE id = ?3",
                    params![status, now, id],
                )
            })
            .map_err(|err| {
                tracing::error!(error = %err, "failed to update order status");
                ApiError::StoreWrite("orders")
            })?;

            if changed == 0 {
                return Err(ApiError::NotFound);
            }
        }

        self.get(id)
    }

    /// Orders the kitchen still has to work on, oldest first.
    pub fn list_for_kitchen(&self, location: Option<&str>) -> Result<Vec<Order>, ApiError> {
        self.list_queue(
            &[OrderStatus::Pending, OrderStatus::Preparing],
            location,
        )
    }

    /// Orders waiting on or out for delivery, oldest first.
    pub fn list_for_delivery(&self, location: Option<&str>) -> Result<Vec<Order>, ApiError> {
        self.list_queue(
            &[OrderStatus::Ready, OrderStatus::OutForDelivery],
            location,
        )
    }

    fn list_queue(
        &self,
        statuses: &[OrderStatus],
        location: Option<&str>,
    ) -> Result<Vec<Order>, ApiError> {
        let mut orders = self.all_in_insertion_order()?;
        orders.retain(|order| statuses.contains(&order.status));
        if let Some(location) = location {
            orders.retain(|order| order.location == location);
        }
        orders.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(orders)
    }

    /// Full order list in creation order. Input to the analytics
    /// recomputation and the snapshot replay.
    pub fn all_in_insertion_order(&self) -> Result<Vec<Order>, ApiError> {
        let conn = self
            .db
            .conn
            .lock()
            .map_err(|_| ApiError::StoreRead("orders"))?;

        let result = (|| -> rusqlite::Result<Vec<Order>> {
            let mut stmt = conn.prepare(
                "SELECT id, customer, location, total, status, created_at, updated_at
                 FROM orders ORDER BY rowid ASC",
            )?;
            let mut orders = stmt
                .query_map([], order_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            for order in &mut orders {
                order.items = load_items(&conn, &order.id)?;
            }
            Ok(orders)
        })();

        result.map_err(|err| {
            tracing::error!(error = %err, "failed to read orders");
            ApiError::StoreRead("orders")
        })
    }
}

fn order_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        customer: row.get(1)?,
        location: row.get(2)?,
        total: row.get(3)?,
        status: row.get(4)?,
        timestamp: row.get(5)?,
        updated_at: row.get(6)?,
        items: Vec::new(),
    })
}

fn load_items(conn: &Connection, order_id: &str) -> rusqlite::Result<Vec<OrderItem>> {
    let mut stmt =
        conn.prepare("SELECT name, price FROM order_items WHERE order_id = ?1 ORDER BY id ASC")?;
    let items = stmt
        .query_map([order_id], |row| {
            Ok(OrderItem {
                name: row.get(0)?,
                price: row.get(1)?,
            })
        })?
        .collect();
    items
}
