//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use krua::{language::Language, shipping::ShippingMethod};
use krua_app::{
    audit::MockAuditService,
    auth::{AccessPolicy, AuthUserUuid, MockAuthService, Principal, Role},
    context::AppContext,
    domain::{
        contact::MockContactService,
        customers::{
            MockCustomersService,
            models::{Customer, CustomerUuid},
        },
        localized::LocalizedText,
        orders::{
            MockOrdersService,
            models::{Address, Order, OrderItem, OrderItemUuid, OrderStatus, OrderUuid, PaymentStatus},
        },
        products::{
            MockProductsService,
            models::{Product, ProductUuid},
        },
        users::MockUsersService,
    },
};
use salvo::{affix_state::inject, prelude::*};
use uuid::Uuid;

use crate::{rate_limit::RateLimiter, state::State};

pub(crate) const TEST_USER_UUID: AuthUserUuid = AuthUserUuid::from_uuid(Uuid::nil());

/// Builds state around mocks with no expectations, so any call a test did not
/// ask for fails it.
pub(crate) struct StateBuilder {
    products: MockProductsService,
    customers: MockCustomersService,
    orders: MockOrdersService,
    contact: MockContactService,
    users: MockUsersService,
    auth: MockAuthService,
    audit: MockAuditService,
    access_policy: AccessPolicy,
    rate_limiter: RateLimiter,
    payment_gateway_key: Option<String>,
}

impl StateBuilder {
    pub(crate) fn new() -> Self {
        Self {
            products: MockProductsService::new(),
            customers: MockCustomersService::new(),
            orders: MockOrdersService::new(),
            contact: MockContactService::new(),
            users: MockUsersService::new(),
            auth: MockAuthService::new(),
            audit: MockAuditService::new(),
            access_policy: AccessPolicy::default(),
            rate_limiter: RateLimiter::default(),
            payment_gateway_key: None,
        }
    }

    pub(crate) fn products(mut self, products: MockProductsService) -> Self {
        self.products = products;
        self
    }

    pub(crate) fn customers(mut self, customers: MockCustomersService) -> Self {
        self.customers = customers;
        self
    }

    pub(crate) fn orders(mut self, orders: MockOrdersService) -> Self {
        self.orders = orders;
        self
    }

    pub(crate) fn contact(mut self, contact: MockContactService) -> Self {
        self.contact = contact;
        self
    }

    pub(crate) fn users(mut self, users: MockUsersService) -> Self {
        self.users = users;
        self
    }

    pub(crate) fn auth(mut self, auth: MockAuthService) -> Self {
        self.auth = auth;
        self
    }

    pub(crate) fn audit(mut self, audit: MockAuditService) -> Self {
        self.audit = audit;
        self
    }

    pub(crate) fn access_policy(mut self, access_policy: AccessPolicy) -> Self {
        self.access_policy = access_policy;
        self
    }

    pub(crate) fn rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub(crate) fn payment_gateway_key(mut self, key: &str) -> Self {
        self.payment_gateway_key = Some(key.to_string());
        self
    }

    pub(crate) fn build(self) -> Arc<State> {
        let app = AppContext {
            products: Arc::new(self.products),
            customers: Arc::new(self.customers),
            orders: Arc::new(self.orders),
            contact: Arc::new(self.contact),
            users: Arc::new(self.users),
            auth: Arc::new(self.auth),
            audit: Arc::new(self.audit),
        };

        State::new(
            app,
            self.access_policy,
            self.rate_limiter,
            self.payment_gateway_key,
        )
        .into_shared()
    }
}

/// A signed-in caller holding `roles`.
pub(crate) fn principal(roles: &[Role]) -> Principal {
    Principal {
        user_uuid: TEST_USER_UUID,
        roles: roles.to_vec(),
        mfa_verified: true,
    }
}

/// Serve `route` without any caller.
pub(crate) fn anonymous_service(state: Arc<State>, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(state)).push(route))
}

/// Serve `route` as if the auth middleware had accepted `principal`.
pub(crate) fn service_as(state: Arc<State>, principal: Principal, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(inject(principal))
            .push(route),
    )
}

pub(crate) fn make_product(uuid: ProductUuid) -> Product {
    Product {
        uuid,
        sku: "KR-PASTE-01".to_string(),
        name: LocalizedText::new("Green curry paste", "พริกแกงเขียวหวาน"),
        description: LocalizedText::new("Pounded by hand", ""),
        price: 4_500,
        category: "pastes".to_string(),
        active: true,
        stock: 12,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        deleted_at: None,
    }
}

pub(crate) fn make_customer(uuid: CustomerUuid) -> Customer {
    Customer {
        uuid,
        auth_user_uuid: Some(TEST_USER_UUID),
        name: "Somchai".to_string(),
        email: "somchai@example.com".to_string(),
        phone: None,
        preferred_language: Language::Th,
        total_orders: 0,
        total_spent: 0,
        last_order_at: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_address() -> Address {
    Address {
        recipient: "Somchai".to_string(),
        line1: "12 Long Street".to_string(),
        line2: None,
        city: "Cape Town".to_string(),
        province: "Western Cape".to_string(),
        postal_code: "8001".to_string(),
        country: "ZA".to_string(),
        phone: None,
    }
}

/// A pending order for two jars of paste, delivered by standard courier.
pub(crate) fn make_order(uuid: OrderUuid, customer: CustomerUuid) -> Order {
    Order {
        uuid,
        customer_uuid: customer,
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        subtotal: 7_826,
        vat: 1_174,
        shipping: 5_000,
        total: 14_000,
        currency: "ZAR".to_string(),
        shipping_method: ShippingMethod::Standard,
        shipping_address: make_address(),
        billing_address: make_address(),
        tracking_number: None,
        confirmation_sent_at: None,
        items: vec![OrderItem {
            uuid: OrderItemUuid::new(),
            order_uuid: uuid,
            product_uuid: Some(ProductUuid::new()),
            product_name: LocalizedText::new("Green curry paste", "พริกแกงเขียวหวาน"),
            product_sku: "KR-PASTE-01".to_string(),
            unit_price: 4_500,
            quantity: 2,
            line_total: 9_000,
        }],
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
