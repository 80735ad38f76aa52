//! Orders service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use krua::{pricing::quote, shipping::ShippingMethod, vat::VatRate};
use mockall::automock;
use rustc_hash::FxHashMap;
use rusty_money::iso;
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};

use crate::{
    auth::AuthUserUuid,
    database::Db,
    domain::{
        customers::{models::CustomerUuid, repository::PgCustomersRepository},
        orders::{
            confirmations::{build_confirmation, build_status_notice, dispatch_confirmation},
            errors::OrdersServiceError,
            models::{
                ConfirmationOutcome, ConfirmationReport, NewOrder, Order, OrderFilter, OrderItem,
                OrderItemUuid, OrderLine, OrderStatus, OrderUuid, PaymentStatus, PlacedOrder,
                Quote, QuoteLine, StatusUpdate,
            },
            repositories::{
                NewOrderRow, OrderRecipient, PgOrderItemsRepository, PgOrdersRepository,
                encode_quantity,
            },
        },
        products::models::{Product, ProductUuid},
        validation,
    },
    notifications::OrderNotifier,
};

/// Store-wide pricing settings.
#[derive(Debug, Clone, Copy)]
pub struct StoreSettings {
    pub vat_rate: VatRate,
    pub currency: &'static iso::Currency,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            vat_rate: VatRate::STANDARD,
            currency: iso::ZAR,
        }
    }
}

pub struct PgOrdersService {
    db: Db,
    orders: PgOrdersRepository,
    items: PgOrderItemsRepository,
    customers: PgCustomersRepository,
    notifier: Arc<dyn OrderNotifier>,
    store: StoreSettings,
}

impl fmt::Debug for PgOrdersService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgOrdersService")
            .field("db", &self.db)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db, notifier: Arc<dyn OrderNotifier>, store: StoreSettings) -> Self {
        Self {
            db,
            orders: PgOrdersRepository::new(),
            items: PgOrderItemsRepository::new(),
            customers: PgCustomersRepository::new(),
            notifier,
            store,
        }
    }

    /// Look up the requested products and check each can be sold in the
    /// requested quantity. With `lock`, the product rows stay locked until the
    /// transaction ends.
    ///
    /// Rows are fetched in uuid order whatever order the lines came in, so two
    /// checkouts sharing products queue on the first shared row instead of
    /// deadlocking. Results follow the line order.
    async fn resolve_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        lines: &[OrderLine],
        lock: bool,
    ) -> Result<Vec<(Product, u32)>, OrdersServiceError> {
        let mut products = FxHashMap::default();

        for product_uuid in product_lock_order(lines.iter().map(|line| line.product_uuid)) {
            if let Some(product) = self.items.find_product(tx, product_uuid, lock).await? {
                products.insert(product_uuid, product);
            }
        }

        let mut resolved = Vec::with_capacity(lines.len());

        for line in lines {
            let product = products
                .remove(&line.product_uuid)
                .filter(|product| product.active)
                .ok_or(OrdersServiceError::ProductUnavailable(line.product_uuid))?;

            if product.stock < line.quantity {
                return Err(OrdersServiceError::InsufficientStock {
                    product: line.product_uuid,
                    requested: line.quantity,
                    available: product.stock,
                });
            }

            resolved.push((product, line.quantity));
        }

        Ok(resolved)
    }

    fn price_lines(
        &self,
        resolved: &[(Product, u32)],
        shipping_method: ShippingMethod,
    ) -> Result<Quote, OrdersServiceError> {
        let mut priced = Vec::with_capacity(resolved.len());
        let mut lines = Vec::with_capacity(resolved.len());

        for (product, quantity) in resolved {
            let unit_price = i64::try_from(product.price)
                .ok()
                .ok_or(OrdersServiceError::InvalidData)?;
            let line_total = unit_price
                .checked_mul(i64::from(*quantity))
                .ok_or(OrdersServiceError::InvalidData)?;

            priced.push((unit_price, *quantity));
            lines.push(QuoteLine {
                product_uuid: product.uuid,
                sku: product.sku.clone(),
                name: product.name.clone(),
                unit_price,
                quantity: *quantity,
                line_total,
            });
        }

        let totals = quote(
            self.store.currency,
            &priced,
            shipping_method,
            self.store.vat_rate,
        )?;

        Ok(Quote {
            lines,
            shipping_method,
            currency: self.store.currency.iso_alpha_code.to_string(),
            totals: totals.to_minor_units(),
        })
    }

    async fn attach_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut orders: Vec<Order>,
    ) -> Result<Vec<Order>, OrdersServiceError> {
        if orders.is_empty() {
            return Ok(orders);
        }

        let uuids: Vec<OrderUuid> = orders.iter().map(|order| order.uuid).collect();

        let mut by_order: FxHashMap<OrderUuid, Vec<OrderItem>> = FxHashMap::default();

        for item in self.items.get_items(tx, &uuids).await? {
            by_order.entry(item.order_uuid).or_default().push(item);
        }

        for order in &mut orders {
            order.items = by_order.remove(&order.uuid).unwrap_or_default();
        }

        Ok(orders)
    }

    async fn load_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut order: Order,
    ) -> Result<Order, OrdersServiceError> {
        order.items = self.items.get_items(tx, &[order.uuid]).await?;

        Ok(order)
    }

    /// Send the confirmation for a committed order and stamp it when sent.
    async fn confirm(&self, order: &mut Order) -> ConfirmationOutcome {
        let recipient = match self.fetch_recipient(order.uuid).await {
            Ok(recipient) => recipient,
            Err(error) => {
                warn!(order_uuid = %order.uuid, error = %error, "could not load order recipient");

                return ConfirmationOutcome::Failed { transient: true };
            }
        };

        let confirmation = build_confirmation(order, &recipient);
        let outcome = dispatch_confirmation(self.notifier.as_ref(), &confirmation).await;

        if outcome == ConfirmationOutcome::Sent {
            match self.stamp_confirmation(order.uuid).await {
                Ok(()) => order.confirmation_sent_at = Some(Timestamp::now()),
                Err(error) => warn!(
                    order_uuid = %order.uuid,
                    error = %error,
                    "confirmation sent but not recorded; it may be sent again"
                ),
            }
        }

        outcome
    }

    async fn fetch_recipient(
        &self,
        order: OrderUuid,
    ) -> Result<OrderRecipient, sqlx::Error> {
        let mut tx = self.db.begin_transaction().await?;

        let recipient = self.orders.get_recipient(&mut tx, order).await?;

        tx.commit().await?;

        Ok(recipient)
    }

    async fn stamp_confirmation(&self, order: OrderUuid) -> Result<(), sqlx::Error> {
        let mut tx = self.db.begin_transaction().await?;

        self.orders.mark_confirmation_sent(&mut tx, order).await?;

        tx.commit().await
    }

    async fn notify_shipped(&self, order: &Order) {
        let recipient = match self.fetch_recipient(order.uuid).await {
            Ok(recipient) => recipient,
            Err(error) => {
                warn!(order_uuid = %order.uuid, error = %error, "could not load order recipient");

                return;
            }
        };

        let notice = build_status_notice(order, &recipient);

        if let Err(error) = self.notifier.send_status_update(&notice).await {
            warn!(order_uuid = %order.uuid, error = %error, "shipping notice not sent");
        }
    }
}

/// The order product rows are locked in. Every transaction that writes to
/// more than one product goes through this.
fn product_lock_order(products: impl IntoIterator<Item = ProductUuid>) -> Vec<ProductUuid> {
    let mut products: Vec<ProductUuid> = products.into_iter().collect();

    products.sort_unstable();
    products.dedup();

    products
}

/// Combine repeated products into one line each, keeping first-seen order.
fn merge_lines(lines: &[OrderLine]) -> Result<Vec<OrderLine>, OrdersServiceError> {
    if lines.is_empty() {
        return Err(OrdersServiceError::NoLines);
    }

    let mut merged: Vec<OrderLine> = Vec::with_capacity(lines.len());

    for line in lines {
        if line.quantity == 0 {
            return Err(OrdersServiceError::ZeroQuantity);
        }

        if let Some(existing) = merged
            .iter_mut()
            .find(|existing| existing.product_uuid == line.product_uuid)
        {
            existing.quantity = existing
                .quantity
                .checked_add(line.quantity)
                .ok_or(OrdersServiceError::InvalidData)?;
        } else {
            merged.push(*line);
        }
    }

    Ok(merged)
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn quote_order(
        &self,
        lines: Vec<OrderLine>,
        shipping_method: ShippingMethod,
    ) -> Result<Quote, OrdersServiceError> {
        let lines = merge_lines(&lines)?;

        let mut tx = self.db.begin_transaction().await?;

        let resolved = self.resolve_lines(&mut tx, &lines, false).await?;

        tx.commit().await?;

        self.price_lines(&resolved, shipping_method)
    }

    async fn place_order(
        &self,
        user: AuthUserUuid,
        order: NewOrder,
    ) -> Result<PlacedOrder, OrdersServiceError> {
        let lines = merge_lines(&order.lines)?;

        let mut tx = self.db.begin_transaction().await?;

        let customer = self
            .customers
            .find_customer_for_user(&mut tx, user)
            .await?
            .ok_or(OrdersServiceError::NoCustomer)?;

        let resolved = self.resolve_lines(&mut tx, &lines, true).await?;
        let quote = self.price_lines(&resolved, order.shipping_method)?;

        let billing_address = order
            .billing_address
            .as_ref()
            .unwrap_or(&order.shipping_address);

        let mut created = self
            .orders
            .create_order(
                &mut tx,
                NewOrderRow {
                    uuid: order.uuid,
                    customer: customer.uuid,
                    totals: quote.totals,
                    currency: &quote.currency,
                    shipping_method: order.shipping_method,
                    shipping_address: &order.shipping_address,
                    billing_address,
                },
            )
            .await?;

        for (position, line) in (0_i32..).zip(&quote.lines) {
            let quantity = encode_quantity(line.quantity)?;

            if !self
                .items
                .decrement_stock(&mut tx, line.product_uuid, quantity)
                .await?
            {
                return Err(OrdersServiceError::InsufficientStock {
                    product: line.product_uuid,
                    requested: line.quantity,
                    available: 0,
                });
            }

            let item = self
                .items
                .create_item(
                    &mut tx,
                    &OrderItem {
                        uuid: OrderItemUuid::new(),
                        order_uuid: created.uuid,
                        product_uuid: Some(line.product_uuid),
                        product_name: line.name.clone(),
                        product_sku: line.sku.clone(),
                        unit_price: line.unit_price,
                        quantity: line.quantity,
                        line_total: line.line_total,
                    },
                    position,
                )
                .await?;

            created.items.push(item);
        }

        self.orders
            .record_customer_order(&mut tx, customer.uuid, created.total, created.created_at)
            .await?;

        tx.commit().await?;

        info!(
            order_uuid = %created.uuid,
            customer_uuid = %customer.uuid,
            total = created.total,
            "order placed"
        );

        let confirmation = self.confirm(&mut created).await;

        Ok(PlacedOrder {
            order: created,
            confirmation,
        })
    }

    async fn retry_pending_confirmations(
        &self,
        limit: u32,
    ) -> Result<ConfirmationReport, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let pending = self.orders.list_unconfirmed_orders(&mut tx, limit).await?;
        let pending = self.attach_items(&mut tx, pending).await?;

        tx.commit().await?;

        let mut report = ConfirmationReport::default();

        for mut order in pending {
            report.attempted += 1;

            match self.confirm(&mut order).await {
                ConfirmationOutcome::Sent => report.sent += 1,
                ConfirmationOutcome::Failed { .. } | ConfirmationOutcome::Disabled => {
                    report.failed += 1;
                }
            }
        }

        info!(
            attempted = report.attempted,
            sent = report.sent,
            failed = report.failed,
            "confirmation retry finished"
        );

        Ok(report)
    }

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let orders = self.orders.list_orders(&mut tx, filter).await?;
        let orders = self.attach_items(&mut tx, orders).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn list_customer_orders(
        &self,
        customer: CustomerUuid,
    ) -> Result<Vec<Order>, OrdersServiceError> {
        self.list_orders(OrderFilter {
            status: None,
            customer: Some(customer),
        })
        .await
    }

    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let order = self.orders.get_order(&mut tx, order).await?;
        let order = self.load_order(&mut tx, order).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn update_status(
        &self,
        order: OrderUuid,
        update: StatusUpdate,
    ) -> Result<Order, OrdersServiceError> {
        let tracking_number = validation::optional(update.tracking_number.as_deref());

        if let Some(tracking_number) = &tracking_number {
            validation::max_chars("tracking_number", tracking_number, 100)?;
        }

        let mut tx = self.db.begin_transaction().await?;

        let current = self.orders.lock_order(&mut tx, order).await?;

        if !current.status.can_transition_to(update.status) {
            return Err(OrdersServiceError::InvalidTransition {
                from: current.status,
                to: update.status,
            });
        }

        let updated = self
            .orders
            .update_status(&mut tx, order, update.status, tracking_number.as_deref())
            .await?;
        let updated = self.load_order(&mut tx, updated).await?;

        tx.commit().await?;

        info!(
            order_uuid = %order,
            from = %current.status,
            to = %updated.status,
            "order status updated"
        );

        if updated.status == OrderStatus::Shipped && current.status != OrderStatus::Shipped {
            self.notify_shipped(&updated).await;
        }

        Ok(updated)
    }

    async fn update_payment_status(
        &self,
        order: OrderUuid,
        payment_status: PaymentStatus,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let current = self.orders.lock_order(&mut tx, order).await?;

        let status = if payment_status == PaymentStatus::Paid
            && current.status == OrderStatus::Pending
        {
            OrderStatus::Processing
        } else {
            current.status
        };

        let updated = self
            .orders
            .update_payment_status(&mut tx, order, payment_status, status)
            .await?;
        let updated = self.load_order(&mut tx, updated).await?;

        tx.commit().await?;

        info!(
            order_uuid = %order,
            payment_status = %payment_status,
            status = %updated.status,
            "payment status updated"
        );

        Ok(updated)
    }

    async fn delete_order(&self, order: OrderUuid) -> Result<(), OrdersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let current = self.orders.lock_order(&mut tx, order).await?;
        let current = self.load_order(&mut tx, current).await?;

        let mut restocks = FxHashMap::default();

        for item in &current.items {
            if let Some(product) = item.product_uuid {
                let quantity = encode_quantity(item.quantity)?;

                restocks
                    .entry(product)
                    .and_modify(|total: &mut i32| *total = total.saturating_add(quantity))
                    .or_insert(quantity);
            }
        }

        for product in product_lock_order(restocks.keys().copied()) {
            if let Some(&quantity) = restocks.get(&product) {
                self.items.restock(&mut tx, product, quantity).await?;
            }
        }

        self.orders
            .reverse_customer_order(&mut tx, current.customer_uuid, order, current.total)
            .await?;

        self.items.delete_items(&mut tx, order).await?;

        if self.orders.delete_order(&mut tx, order).await? == 0 {
            return Err(OrdersServiceError::NotFound);
        }

        tx.commit().await?;

        info!(order_uuid = %order, "order deleted and stock restored");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Price a basket without reserving anything.
    async fn quote_order(
        &self,
        lines: Vec<OrderLine>,
        shipping_method: ShippingMethod,
    ) -> Result<Quote, OrdersServiceError>;

    /// Place an order for the user's customer profile.
    ///
    /// Stock, the order, its items and the customer's totals are written in a
    /// single transaction. The confirmation email is attempted after commit and
    /// never fails the order.
    async fn place_order(
        &self,
        user: AuthUserUuid,
        order: NewOrder,
    ) -> Result<PlacedOrder, OrdersServiceError>;

    /// Resend confirmations for orders that never got one.
    async fn retry_pending_confirmations(
        &self,
        limit: u32,
    ) -> Result<ConfirmationReport, OrdersServiceError>;

    async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, OrdersServiceError>;

    async fn list_customer_orders(
        &self,
        customer: CustomerUuid,
    ) -> Result<Vec<Order>, OrdersServiceError>;

    async fn get_order(&self, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// Move an order along its lifecycle. Moving to `shipped` emails the customer.
    async fn update_status(
        &self,
        order: OrderUuid,
        update: StatusUpdate,
    ) -> Result<Order, OrdersServiceError>;

    /// Record a payment result. A paid pending order moves to `processing`.
    async fn update_payment_status(
        &self,
        order: OrderUuid,
        payment_status: PaymentStatus,
    ) -> Result<Order, OrdersServiceError>;

    /// Delete an order, returning its stock and reversing the customer's totals.
    async fn delete_order(&self, order: OrderUuid) -> Result<(), OrdersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            customers::CustomersService,
            products::{ProductsService, models::ProductUuid},
        },
        notifications::{MockOrderNotifier, NotificationError},
        test::{
            TestContext,
            helpers::{address, new_customer, new_product},
        },
    };

    use super::*;

    fn line(product: ProductUuid, quantity: u32) -> OrderLine {
        OrderLine {
            product_uuid: product,
            quantity,
        }
    }

    fn new_order(lines: Vec<OrderLine>) -> NewOrder {
        NewOrder {
            uuid: OrderUuid::new(),
            lines,
            shipping_method: ShippingMethod::Standard,
            shipping_address: address(),
            billing_address: None,
        }
    }

    async fn shopper(ctx: &TestContext, email: &str) -> TestResult<AuthUserUuid> {
        let user = ctx.create_user(email).await?;

        ctx.customers
            .create_customer(user, new_customer(CustomerUuid::new(), email))
            .await?;

        Ok(user)
    }

    #[test]
    fn merge_lines_combines_repeated_products() -> TestResult {
        let a = ProductUuid::new();
        let b = ProductUuid::new();

        let merged = merge_lines(&[line(a, 1), line(b, 2), line(a, 3)])?;

        assert_eq!(merged, vec![line(a, 4), line(b, 2)]);

        Ok(())
    }

    #[test]
    fn products_are_locked_in_uuid_order() {
        let low = ProductUuid::from_uuid(uuid::Uuid::from_u128(1));
        let high = ProductUuid::from_uuid(uuid::Uuid::from_u128(2));

        assert_eq!(product_lock_order([high, low, high]), vec![low, high]);
        assert_eq!(product_lock_order([low, high]), product_lock_order([high, low]));
    }

    #[test]
    fn merge_lines_rejects_empty_and_zero() {
        assert!(matches!(merge_lines(&[]), Err(OrdersServiceError::NoLines)));
        assert!(matches!(
            merge_lines(&[line(ProductUuid::new(), 0)]),
            Err(OrdersServiceError::ZeroQuantity)
        ));
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn quote_prices_basket_with_vat_and_shipping() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ProductUuid::new();

        ctx.products
            .create_product(new_product(product, "KR-001", 11_500, 10))
            .await?;

        let quote = ctx
            .orders
            .quote_order(vec![line(product, 2)], ShippingMethod::Standard)
            .await?;

        assert_eq!(quote.totals.subtotal, 20_000);
        assert_eq!(quote.totals.vat, 3_000);
        assert_eq!(quote.totals.shipping, 5_000);
        assert_eq!(quote.totals.total, 28_000);
        assert_eq!(quote.currency, "ZAR");

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn place_order_reserves_stock_and_updates_customer() -> TestResult {
        let ctx = TestContext::new().await;
        let user = shopper(&ctx, "malee@example.com").await?;
        let product = ProductUuid::new();

        ctx.products
            .create_product(new_product(product, "KR-001", 11_500, 5))
            .await?;

        let placed = ctx
            .orders
            .place_order(user, new_order(vec![line(product, 1), line(product, 1)]))
            .await?;

        assert_eq!(placed.order.total, 28_000);
        assert_eq!(placed.order.items.len(), 1);
        assert_eq!(placed.order.billing_address, placed.order.shipping_address);
        assert_eq!(placed.confirmation, ConfirmationOutcome::Disabled);
        assert!(placed.order.confirmation_sent_at.is_none());

        assert_eq!(ctx.products.get_product(product).await?.stock, 3);

        let customer = ctx.customers.get_customer_for_user(user).await?;

        assert_eq!(customer.total_orders, 1);
        assert_eq!(customer.total_spent, 28_000);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn concurrent_orders_listing_products_in_opposite_order_both_commit() -> TestResult {
        let ctx = TestContext::new().await;
        let khao_soi = ProductUuid::new();
        let nam_prik = ProductUuid::new();

        ctx.products
            .create_product(new_product(khao_soi, "KR-001", 11_500, 50))
            .await?;
        ctx.products
            .create_product(new_product(nam_prik, "KR-002", 4_500, 50))
            .await?;

        let first = shopper(&ctx, "first@example.com").await?;
        let second = shopper(&ctx, "second@example.com").await?;

        for _ in 0..10 {
            let (one, two) = tokio::join!(
                ctx.orders.place_order(
                    first,
                    new_order(vec![line(khao_soi, 1), line(nam_prik, 1)])
                ),
                ctx.orders.place_order(
                    second,
                    new_order(vec![line(nam_prik, 1), line(khao_soi, 1)])
                ),
            );

            one?;
            two?;
        }

        assert_eq!(ctx.products.get_product(khao_soi).await?.stock, 30);
        assert_eq!(ctx.products.get_product(nam_prik).await?.stock, 30);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn place_order_fails_atomically_on_short_stock() -> TestResult {
        let ctx = TestContext::new().await;
        let user = shopper(&ctx, "malee@example.com").await?;
        let plenty = ProductUuid::new();
        let scarce = ProductUuid::new();

        ctx.products
            .create_product(new_product(plenty, "KR-001", 1_000, 10))
            .await?;
        ctx.products
            .create_product(new_product(scarce, "KR-002", 1_000, 1))
            .await?;

        let result = ctx
            .orders
            .place_order(user, new_order(vec![line(plenty, 2), line(scarce, 2)]))
            .await;

        assert!(matches!(
            result,
            Err(OrdersServiceError::InsufficientStock {
                requested: 2,
                available: 1,
                ..
            })
        ));

        assert_eq!(ctx.products.get_product(plenty).await?.stock, 10);
        assert!(ctx.orders.list_orders(OrderFilter::default()).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn place_order_requires_customer_profile() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("nobody@example.com").await?;

        let result = ctx
            .orders
            .place_order(user, new_order(vec![line(ProductUuid::new(), 1)]))
            .await;

        assert!(matches!(result, Err(OrdersServiceError::NoCustomer)));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn resubmitted_order_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let user = shopper(&ctx, "malee@example.com").await?;
        let product = ProductUuid::new();

        ctx.products
            .create_product(new_product(product, "KR-001", 1_000, 10))
            .await?;

        let order = new_order(vec![line(product, 1)]);

        ctx.orders.place_order(user, order.clone()).await?;

        let again = ctx.orders.place_order(user, order).await;

        assert!(matches!(again, Err(OrdersServiceError::AlreadyExists)));
        assert_eq!(ctx.products.get_product(product).await?.stock, 9);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn sent_confirmation_is_recorded() -> TestResult {
        let ctx = TestContext::new().await;
        let user = shopper(&ctx, "malee@example.com").await?;
        let product = ProductUuid::new();

        ctx.products
            .create_product(new_product(product, "KR-001", 1_000, 10))
            .await?;

        let mut notifier = MockOrderNotifier::new();
        notifier
            .expect_send_order_confirmation()
            .times(1)
            .return_once(|_| Ok(()));

        let orders = PgOrdersService::new(ctx.app_db(), Arc::new(notifier), StoreSettings::default());

        let placed = orders
            .place_order(user, new_order(vec![line(product, 1)]))
            .await?;

        assert_eq!(placed.confirmation, ConfirmationOutcome::Sent);

        let stored = orders.get_order(placed.order.uuid).await?;

        assert!(stored.confirmation_sent_at.is_some());

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn failed_confirmations_are_retried() -> TestResult {
        let ctx = TestContext::new().await;
        let user = shopper(&ctx, "malee@example.com").await?;
        let product = ProductUuid::new();

        ctx.products
            .create_product(new_product(product, "KR-001", 1_000, 10))
            .await?;

        let mut failing = MockOrderNotifier::new();
        failing
            .expect_send_order_confirmation()
            .return_once(|_| Err(NotificationError::Timeout));

        let placed = PgOrdersService::new(ctx.app_db(), Arc::new(failing), StoreSettings::default())
            .place_order(user, new_order(vec![line(product, 1)]))
            .await?;

        assert_eq!(
            placed.confirmation,
            ConfirmationOutcome::Failed { transient: true }
        );

        let mut working = MockOrderNotifier::new();
        working
            .expect_send_order_confirmation()
            .times(1)
            .return_once(|_| Ok(()));

        let retrying =
            PgOrdersService::new(ctx.app_db(), Arc::new(working), StoreSettings::default());

        let report = retrying.retry_pending_confirmations(10).await?;

        assert_eq!(
            report,
            ConfirmationReport {
                attempted: 1,
                sent: 1,
                failed: 0,
            }
        );

        let again = retrying.retry_pending_confirmations(10).await?;

        assert_eq!(again.attempted, 0);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn status_follows_lifecycle() -> TestResult {
        let ctx = TestContext::new().await;
        let user = shopper(&ctx, "malee@example.com").await?;
        let product = ProductUuid::new();

        ctx.products
            .create_product(new_product(product, "KR-001", 1_000, 10))
            .await?;

        let placed = ctx
            .orders
            .place_order(user, new_order(vec![line(product, 1)]))
            .await?;
        let uuid = placed.order.uuid;

        let skipped = ctx
            .orders
            .update_status(
                uuid,
                StatusUpdate {
                    status: OrderStatus::Delivered,
                    tracking_number: None,
                },
            )
            .await;

        assert!(matches!(
            skipped,
            Err(OrdersServiceError::InvalidTransition { .. })
        ));

        let paid = ctx
            .orders
            .update_payment_status(uuid, PaymentStatus::Paid)
            .await?;

        assert_eq!(paid.status, OrderStatus::Processing);

        let shipped = ctx
            .orders
            .update_status(
                uuid,
                StatusUpdate {
                    status: OrderStatus::Shipped,
                    tracking_number: Some(" TRK123 ".to_string()),
                },
            )
            .await?;

        assert_eq!(shipped.status, OrderStatus::Shipped);
        assert_eq!(shipped.tracking_number.as_deref(), Some("TRK123"));

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a container runtime"]
    async fn delete_order_restocks_and_reverses_totals() -> TestResult {
        let ctx = TestContext::new().await;
        let user = shopper(&ctx, "malee@example.com").await?;
        let product = ProductUuid::new();

        ctx.products
            .create_product(new_product(product, "KR-001", 1_000, 10))
            .await?;

        let placed = ctx
            .orders
            .place_order(user, new_order(vec![line(product, 3)]))
            .await?;

        ctx.orders.delete_order(placed.order.uuid).await?;

        assert_eq!(ctx.products.get_product(product).await?.stock, 10);

        let customer = ctx.customers.get_customer_for_user(user).await?;

        assert_eq!(customer.total_orders, 0);
        assert_eq!(customer.total_spent, 0);
        assert!(customer.last_order_at.is_none());

        let missing = ctx.orders.get_order(placed.order.uuid).await;

        assert!(matches!(missing, Err(OrdersServiceError::NotFound)));

        Ok(())
    }
}
