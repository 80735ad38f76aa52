//! Order Repositories

mod items;
mod orders;

pub(crate) use items::{PgOrderItemsRepository, encode_quantity};
pub(crate) use orders::{NewOrderRow, OrderRecipient, PgOrdersRepository};
