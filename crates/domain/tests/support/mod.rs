//! Fixtures shared by the domain integration suites.

#![allow(dead_code)]

use common::RecordId;
use document_store::InMemoryDocumentStore;
use domain::{
    CartPricing, CartService, CreateProduct, OrderService, ProductService, ShippingAddress,
    UserDetails, UserService,
};

pub struct Services {
    pub store: InMemoryDocumentStore,
    pub users: UserService<InMemoryDocumentStore>,
    pub products: ProductService<InMemoryDocumentStore>,
    pub carts: CartService<InMemoryDocumentStore>,
    pub orders: OrderService<InMemoryDocumentStore>,
}

pub fn services(pricing: CartPricing) -> Services {
    let store = InMemoryDocumentStore::new();
    Services {
        users: UserService::new(store.clone()),
        products: ProductService::new(store.clone()),
        carts: CartService::new(store.clone(), pricing),
        orders: OrderService::new(store.clone()),
        store,
    }
}

pub async fn register(s: &Services, email: &str) -> RecordId {
    s.users
        .create_user(UserDetails {
            name: "Test Shopper".to_string(),
            email: email.to_string(),
            age: 30,
            password: "hunter22".to_string(),
            address: None,
            hobbies: vec![],
        })
        .await
        .unwrap()
        .id
}

pub async fn stock(s: &Services, name: &str, price_cents: i64) -> RecordId {
    s.products
        .create_product(CreateProduct {
            name: name.to_string(),
            price_cents,
            description: None,
            category: None,
            stock: 100,
            is_available: true,
            image_url: format!("https://img.example.com/{name}.png"),
        })
        .await
        .unwrap()
        .id
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        street: "221B Baker Street".to_string(),
        city: "London".to_string(),
        state: None,
        postal_code: "NW1 6XE".to_string(),
        country: "UK".to_string(),
    }
}
