//! Orders Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use krua::{language::Language, pricing::MinorTotals, shipping::ShippingMethod};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, types::Json};
use uuid::Uuid;

use crate::domain::{
    customers::models::CustomerUuid,
    orders::models::{
        Address, Order, OrderFilter, OrderStatus, OrderUuid, PaymentStatus,
    },
};

const CREATE_ORDER_SQL: &str = include_str!("../sql/create_order.sql");
const GET_ORDER_SQL: &str = include_str!("../sql/get_order.sql");
const LOCK_ORDER_SQL: &str = include_str!("../sql/lock_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("../sql/list_orders.sql");
const LIST_UNCONFIRMED_ORDERS_SQL: &str = include_str!("../sql/list_unconfirmed_orders.sql");
const UPDATE_ORDER_STATUS_SQL: &str = include_str!("../sql/update_order_status.sql");
const UPDATE_PAYMENT_STATUS_SQL: &str = include_str!("../sql/update_payment_status.sql");
const MARK_CONFIRMATION_SENT_SQL: &str = include_str!("../sql/mark_confirmation_sent.sql");
const DELETE_ORDER_SQL: &str = include_str!("../sql/delete_order.sql");
const RECORD_CUSTOMER_ORDER_SQL: &str = include_str!("../sql/record_customer_order.sql");
const REVERSE_CUSTOMER_ORDER_SQL: &str = include_str!("../sql/reverse_customer_order.sql");
const GET_ORDER_RECIPIENT_SQL: &str = include_str!("../sql/get_order_recipient.sql");

/// Who order emails go to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrderRecipient {
    pub name: String,
    pub email: String,
    pub language: Language,
}

/// Values for a new order row.
#[derive(Debug)]
pub(crate) struct NewOrderRow<'a> {
    pub uuid: OrderUuid,
    pub customer: CustomerUuid,
    pub totals: MinorTotals,
    pub currency: &'a str,
    pub shipping_method: ShippingMethod,
    pub shipping_address: &'a Address,
    pub billing_address: &'a Address,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: NewOrderRow<'_>,
    ) -> Result<Order, sqlx::Error> {
        query_as::<Postgres, Order>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.customer.into_uuid())
            .bind(order.totals.subtotal)
            .bind(order.totals.vat)
            .bind(order.totals.shipping)
            .bind(order.totals.total)
            .bind(order.currency)
            .bind(order.shipping_method.as_str())
            .bind(Json(order.shipping_address))
            .bind(Json(order.billing_address))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Order, sqlx::Error> {
        query_as::<Postgres, Order>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<Order, sqlx::Error> {
        query_as::<Postgres, Order>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: OrderFilter,
    ) -> Result<Vec<Order>, sqlx::Error> {
        query_as::<Postgres, Order>(LIST_ORDERS_SQL)
            .bind(filter.status.map(OrderStatus::as_str))
            .bind(filter.customer.map(CustomerUuid::into_uuid))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn list_unconfirmed_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        limit: u32,
    ) -> Result<Vec<Order>, sqlx::Error> {
        query_as::<Postgres, Order>(LIST_UNCONFIRMED_ORDERS_SQL)
            .bind(i64::from(limit))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: OrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<Order, sqlx::Error> {
        query_as::<Postgres, Order>(UPDATE_ORDER_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .bind(tracking_number)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_payment_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        payment_status: PaymentStatus,
        status: OrderStatus,
    ) -> Result<Order, sqlx::Error> {
        query_as::<Postgres, Order>(UPDATE_PAYMENT_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(payment_status.as_str())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn mark_confirmation_sent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_CONFIRMATION_SENT_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn delete_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_ORDER_SQL)
            .bind(order.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn record_customer_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
        total: i64,
        at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        query(RECORD_CUSTOMER_ORDER_SQL)
            .bind(customer.into_uuid())
            .bind(total)
            .bind(SqlxTimestamp::from(at))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn reverse_customer_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: CustomerUuid,
        order: OrderUuid,
        total: i64,
    ) -> Result<(), sqlx::Error> {
        query(REVERSE_CUSTOMER_ORDER_SQL)
            .bind(customer.into_uuid())
            .bind(order.into_uuid())
            .bind(total)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn get_recipient(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecipient, sqlx::Error> {
        query_as::<Postgres, OrderRecipient>(GET_ORDER_RECIPIENT_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }
}

fn decode_column<T, E>(row: &PgRow, column: &str, parse: impl FnOnce(&str) -> Result<T, E>) -> sqlx::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let value: String = row.try_get(column)?;

    parse(&value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            customer_uuid: CustomerUuid::from_uuid(row.try_get::<Uuid, _>("customer_uuid")?),
            status: decode_column(row, "status", str::parse::<OrderStatus>)?,
            payment_status: decode_column(row, "payment_status", str::parse::<PaymentStatus>)?,
            subtotal: row.try_get("subtotal")?,
            vat: row.try_get("vat")?,
            shipping: row.try_get("shipping")?,
            total: row.try_get("total")?,
            currency: row.try_get("currency")?,
            shipping_method: decode_column(row, "shipping_method", str::parse::<ShippingMethod>)?,
            shipping_address: row.try_get::<Json<Address>, _>("shipping_address")?.0,
            billing_address: row.try_get::<Json<Address>, _>("billing_address")?.0,
            tracking_number: row.try_get("tracking_number")?,
            confirmation_sent_at: row
                .try_get::<Option<SqlxTimestamp>, _>("confirmation_sent_at")?
                .map(SqlxTimestamp::to_jiff),
            items: Vec::new(),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderRecipient {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            language: decode_column(row, "preferred_language", str::parse::<Language>)?,
        })
    }
}
