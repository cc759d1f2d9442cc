use tracing::info;

use crate::analytics::AnalyticsEngine;
use crate::error::ApiError;
use crate::models::{CreateOrder, Order, OrderStatus};
use crate::repo::OrderStore;

/// Transition rules for order statuses.
///
/// The default is permissive: any recognized status is reachable from any
/// state. Call sites rely on that (the kitchen moves `ready` back to
/// `pending` to undo a mistake). The strict table limits transitions to the
/// forward pipeline plus cancellation from non-terminal states.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecyclePolicy {
    pub strict: bool,
}

impl LifecyclePolicy {
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn validate(&self, from: OrderStatus, to: OrderStatus) -> Result<(), ApiError> {
        if self.strict && !Self::adjacent(from, to) {
            return Err(ApiError::Validation(format!(
                "Invalid transition from {from} to {to}"
            )));
        }
        Ok(())
    }

    fn adjacent(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            (OrderStatus::Pending, OrderStatus::Preparing)
                | (OrderStatus::Preparing, OrderStatus::Ready)
                | (OrderStatus::Ready, OrderStatus::OutForDelivery)
                | (OrderStatus::OutForDelivery, OrderStatus::Completed)
        ) || (to == OrderStatus::Cancelled && !from.is_terminal())
    }
}

/// Drives order creation and status changes: validates the target status,
/// applies the transition policy, persists, keeps the analytics snapshot in
/// step and emits one activity event per change.
#[derive(Clone)]
pub struct OrderLifecycle {
    store: OrderStore,
    analytics: AnalyticsEngine,
    policy: LifecyclePolicy,
}

impl OrderLifecycle {
    pub fn new(store: OrderStore, analytics: AnalyticsEngine, policy: LifecyclePolicy) -> Self {
        Self {
            store,
            analytics,
            policy,
        }
    }

    /// Create an order (always starting at `pending`) and fold it into the
    /// analytics snapshot.
    pub fn place(&self, draft: CreateOrder) -> Result<Order, ApiError> {
        let order = self.store.create(draft)?;
        self.analytics.record_order(&order)?;
        info!(
            target: "activity",
            actor = "api",
            order_id = %order.id,
            status = %order.status,
            "order placed"
        );
        Ok(order)
    }

    /// Move an order to a new status. The raw string must name a recognized
    /// status; reachability is only checked under a strict policy.
    pub fn transition(&self, id: &str, raw_status: &str, actor: &str) -> Result<Order, ApiError> {
        let status = OrderStatus::parse(raw_status)
            .ok_or_else(|| ApiError::InvalidStatus(OrderStatus::allowed_values()))?;

        let current = self.store.get(id)?;
        self.policy.validate(current.status, status)?;

        let order = self.store.update_status(id, status)?;
        info!(
            target: "activity",
            actor = %actor,
            order_id = %order.id,
            status = %status,
            "order status updated"
        );
        Ok(order)
    }
}
