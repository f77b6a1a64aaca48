//! Integration tests for the cart engine.
//!
//! These tests verify the one-active-cart rule, cart pricing, and the
//! referential guards on user and product deletion.

mod support;

use std::sync::Arc;

use common::RecordId;
use document_store::{DocumentStore, DocumentStoreExt, Filter};
use domain::{
    ACTIVE_CART_EXISTS, Cart, CartItemInput, CartPricing, CartStatus, CreateCart, DomainError,
    UpdateCartItems,
};
use support::{register, services, stock};

fn create(user_id: &RecordId, items: Vec<CartItemInput>) -> CreateCart {
    CreateCart {
        user_id: user_id.to_string(),
        items,
    }
}

mod one_active_cart {
    use super::*;

    #[tokio::test]
    async fn first_cart_is_active_with_placeholder_total() {
        let s = services(CartPricing::Placeholder);
        let user = register(&s, "u@example.com").await;
        let product = stock(&s, "p", 1999).await;

        let cart = s
            .carts
            .create_cart(create(&user, vec![CartItemInput::new(&product, 2)]))
            .await
            .unwrap();

        assert_eq!(cart.status, CartStatus::Active);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product_id, product);
        assert_eq!(cart.items[0].quantity, 2);
        assert!(cart.total_price.is_zero());
    }

    #[tokio::test]
    async fn second_cart_conflicts_and_first_is_unchanged() {
        let s = services(CartPricing::Placeholder);
        let user = register(&s, "u@example.com").await;
        let product = stock(&s, "p", 1999).await;

        let first = s
            .carts
            .create_cart(create(&user, vec![CartItemInput::new(&product, 2)]))
            .await
            .unwrap();

        let err = s
            .carts
            .create_cart(create(&user, vec![]))
            .await
            .unwrap_err();
        assert!(matches!(&err, DomainError::Conflict(msg) if msg == ACTIVE_CART_EXISTS));

        let active = s.carts.get_active_cart(&user).await.unwrap();
        assert_eq!(active.cart, first);
        assert_eq!(s.store.count("carts").await, 1);
    }

    #[tokio::test]
    async fn concurrent_creates_leave_one_active_cart() {
        let s = Arc::new(services(CartPricing::Catalog));
        let user = register(&s, "race@example.com").await;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let s = Arc::clone(&s);
                let user = user.clone();
                tokio::spawn(async move { s.carts.create_cart(create(&user, vec![])).await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(DomainError::Conflict(msg)) => assert_eq!(msg, ACTIVE_CART_EXISTS),
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(created, 1);

        let active: Vec<Cart> = s
            .store
            .find(
                Filter::new()
                    .eq("user_id", user.as_str())
                    .eq("status", "active"),
            )
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn active_cart_lookup_for_user_without_cart_is_not_found() {
        let s = services(CartPricing::Catalog);
        let user = register(&s, "u@example.com").await;

        let err = s.carts.get_active_cart(&user).await.unwrap_err();
        assert!(err.is_not_found());
    }
}

mod items_and_pricing {
    use super::*;

    #[tokio::test]
    async fn catalog_pricing_follows_current_prices() {
        let s = services(CartPricing::Catalog);
        let user = register(&s, "u@example.com").await;
        let tea = stock(&s, "tea", 450).await;
        let cup = stock(&s, "cup", 1200).await;

        let cart = s
            .carts
            .create_cart(create(&user, vec![CartItemInput::new(&tea, 2)]))
            .await
            .unwrap();
        assert_eq!(cart.total_price.cents(), 900);

        s.products
            .update_product(
                &tea,
                domain::UpdateProduct {
                    price_cents: Some(500),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let cart = s
            .carts
            .update_cart_items(
                &cart.id,
                UpdateCartItems {
                    items: Some(vec![CartItemInput::new(&tea, 2), CartItemInput::new(&cup, 1)]),
                },
            )
            .await
            .unwrap();
        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.total_price.cents(), 2200);
    }

    #[tokio::test]
    async fn unknown_product_is_rejected_without_write() {
        let s = services(CartPricing::Catalog);
        let user = register(&s, "u@example.com").await;

        let err = s
            .carts
            .create_cart(create(&user, vec![CartItemInput::new(RecordId::new(), 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Product", .. }));
        assert_eq!(s.store.count("carts").await, 0);
    }

    #[tokio::test]
    async fn zero_quantity_is_a_validation_error() {
        let s = services(CartPricing::Catalog);
        let user = register(&s, "u@example.com").await;
        let product = stock(&s, "p", 100).await;

        let err = s
            .carts
            .create_cart(create(&user, vec![CartItemInput::new(&product, 0)]))
            .await
            .unwrap_err();
        match err {
            DomainError::Validation(errors) => assert!(errors.contains("items[0].quantity")),
            other => panic!("expected validation error, got {other}"),
        }
        assert_eq!(s.store.count("carts").await, 0);
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let s = services(CartPricing::Catalog);
        let user = register(&s, "u@example.com").await;
        let product = stock(&s, "p", 300).await;
        let cart = s
            .carts
            .create_cart(create(&user, vec![CartItemInput::new(&product, 3)]))
            .await
            .unwrap();

        for _ in 0..2 {
            let cleared = s.carts.clear_cart(&cart.id).await.unwrap();
            assert!(cleared.items.is_empty());
            assert!(cleared.total_price.is_zero());
            assert_eq!(cleared.status, CartStatus::Active);
        }
    }

    #[tokio::test]
    async fn operations_on_missing_cart_are_not_found() {
        let s = services(CartPricing::Catalog);
        let missing = RecordId::new();

        assert!(s.carts.get_cart(&missing).await.unwrap_err().is_not_found());
        assert!(s.carts.clear_cart(&missing).await.unwrap_err().is_not_found());
        assert!(s.carts.delete_cart(&missing).await.unwrap_err().is_not_found());
        assert!(
            s.carts
                .update_cart_items(&missing, UpdateCartItems { items: None })
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn deleting_the_active_cart_allows_a_new_one() {
        let s = services(CartPricing::Catalog);
        let user = register(&s, "u@example.com").await;
        let cart = s.carts.create_cart(create(&user, vec![])).await.unwrap();

        s.carts.delete_cart(&cart.id).await.unwrap();
        let again = s.carts.create_cart(create(&user, vec![])).await.unwrap();
        assert_ne!(again.id, cart.id);
    }
}

mod referential_guards {
    use super::*;

    #[tokio::test]
    async fn product_in_active_cart_cannot_be_deleted() {
        let s = services(CartPricing::Catalog);
        let user = register(&s, "u@example.com").await;
        let product = stock(&s, "p", 100).await;
        let cart = s
            .carts
            .create_cart(create(&user, vec![CartItemInput::new(&product, 1)]))
            .await
            .unwrap();

        let err = s.products.delete_product(&product).await.unwrap_err();
        assert!(err.is_conflict());

        s.carts.clear_cart(&cart.id).await.unwrap();
        s.products.delete_product(&product).await.unwrap();
    }

    #[tokio::test]
    async fn user_with_cart_cannot_be_deleted() {
        let s = services(CartPricing::Catalog);
        let user = register(&s, "u@example.com").await;
        let cart = s.carts.create_cart(create(&user, vec![])).await.unwrap();

        assert!(s.users.delete_user(&user).await.unwrap_err().is_conflict());

        s.carts.delete_cart(&cart.id).await.unwrap();
        s.users.delete_user(&user).await.unwrap();
        assert!(
            !s.store
                .exists::<domain::User>(Filter::new())
                .await
                .unwrap()
        );
    }
}
