//! Order service providing order placement and status updates.

use chrono::Utc;
use common::RecordId;
use document_store::{DocumentStore, Filter};
use validator::Validate;

use super::commands::{into_order_items, parse_status};
use super::{CreateOrder, Order, OrderStatus, PaymentMethod, PaymentStatus, UpdateOrder};
use crate::error::DomainError;
use crate::pricing::Money;
use crate::references::{require_products, require_user};
use crate::validation::{FieldErrors, parse_id};

/// Service for managing orders.
#[derive(Clone)]
pub struct OrderService<S> {
    store: S,
}

impl<S: DocumentStore> OrderService<S> {
    /// Creates a new order service backed by `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Lists orders, optionally only those of one user.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, user_id: Option<&RecordId>) -> Result<Vec<Order>, DomainError> {
        let filter = match user_id {
            Some(user_id) => Filter::new().eq("user_id", user_id.as_str()),
            None => Filter::new(),
        };
        Ok(self.store.find(filter).await?)
    }

    /// Loads an order by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: &RecordId) -> Result<Order, DomainError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", id))
    }

    /// Lists the orders of a user, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn get_orders_for_user(&self, user_id: &RecordId) -> Result<Vec<Order>, DomainError> {
        Ok(self
            .store
            .find(Filter::new().eq("user_id", user_id.as_str()).newest_first())
            .await?)
    }

    /// Places an order.
    ///
    /// The stored total is always the sum of the lines; a supplied total is
    /// only compared against it.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<Order, DomainError> {
        cmd.validate()?;
        let user_id = parse_id("user_id", &cmd.user_id)?;
        let items = into_order_items(cmd.items)?;
        let payment_method: PaymentMethod = parse_status("payment_method", &cmd.payment_method)?;

        require_user(&self.store, &user_id).await?;
        require_products(&self.store, items.iter().map(|i| &i.product_id)).await?;

        let now = Utc::now();
        let mut order = Order {
            id: RecordId::new(),
            user_id,
            items,
            total_amount: Money::zero(),
            shipping_address: cmd.shipping_address,
            payment_method,
            payment_status: PaymentStatus::default(),
            order_status: OrderStatus::default(),
            ordered_at: now,
            created_at: now,
            updated_at: now,
        };
        prepare_for_write(&mut order, cmd.total_amount_cents.map(Money::from_cents))?;

        self.store.insert(&order).await?;

        metrics::counter!("orders_created_total").increment(1);
        metrics::histogram!("order_total_cents").record(order.total_amount.cents() as f64);
        tracing::info!(order_id = %order.id, total = %order.total_amount, "order placed");
        Ok(order)
    }

    /// Applies a partial update to an order and recomputes its total.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_order(
        &self,
        id: &RecordId,
        patch: UpdateOrder,
    ) -> Result<Order, DomainError> {
        patch.validate()?;
        let mut order = self.get_order(id).await?;

        if let Some(inputs) = patch.items {
            let items = into_order_items(inputs)?;
            require_products(&self.store, items.iter().map(|i| &i.product_id)).await?;
            order.items = items;
        }
        if let Some(address) = patch.shipping_address {
            order.shipping_address = address;
        }
        if let Some(method) = patch.payment_method {
            order.payment_method = parse_status("payment_method", &method)?;
        }
        if let Some(status) = patch.payment_status {
            order.payment_status = parse_status("payment_status", &status)?;
        }
        if let Some(status) = patch.order_status {
            let next: OrderStatus = parse_status("order_status", &status)?;
            if !order.order_status.follows_lifecycle(next) {
                tracing::warn!(
                    order_id = %order.id,
                    from = %order.order_status,
                    to = %next,
                    "order status moved against its lifecycle"
                );
            }
            order.order_status = next;
        }
        prepare_for_write(&mut order, patch.total_amount_cents.map(Money::from_cents))?;

        if !self.store.replace(&order).await? {
            return Err(DomainError::not_found("Order", id));
        }
        Ok(order)
    }

    /// Deletes an order.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, id: &RecordId) -> Result<Order, DomainError> {
        let order = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Order", id))?;

        metrics::counter!("orders_deleted_total").increment(1);
        Ok(order)
    }
}

/// Runs before every persist: the total is recomputed from the lines.
fn prepare_for_write(order: &mut Order, supplied_total: Option<Money>) -> Result<(), DomainError> {
    order
        .recompute_total()
        .map_err(|e| FieldErrors::single("total_amount_cents", e.to_string()))?;
    if let Some(supplied) = supplied_total
        && supplied != order.total_amount
    {
        tracing::warn!(
            order_id = %order.id,
            supplied = %supplied,
            computed = %order.total_amount,
            "supplied order total ignored"
        );
    }
    order.updated_at = Utc::now();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderItemInput, ShippingAddress};
    use document_store::InMemoryDocumentStore;

    fn address() -> ShippingAddress {
        ShippingAddress {
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: None,
            postal_code: "12345".to_string(),
            country: "US".to_string(),
        }
    }

    #[tokio::test]
    async fn create_requires_existing_user() {
        let service = OrderService::new(InMemoryDocumentStore::new());
        let err = service
            .create_order(CreateOrder {
                user_id: RecordId::new().to_string(),
                items: vec![OrderItemInput::new(RecordId::new(), 1, 100)],
                total_amount_cents: None,
                payment_method: "cod".to_string(),
                shipping_address: address(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "User", .. }));
    }

    #[tokio::test]
    async fn update_missing_order_is_not_found() {
        let service = OrderService::new(InMemoryDocumentStore::new());
        let err = service
            .update_order(&RecordId::new(), UpdateOrder::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_missing_order_is_not_found() {
        let service = OrderService::new(InMemoryDocumentStore::new());
        let err = service.delete_order(&RecordId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
