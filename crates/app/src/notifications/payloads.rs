//! Notification payloads, rendered in the customer's language.

use krua::language::Language;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfirmationLine {
    pub name: String,
    pub sku: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub line_total: i64,
}

/// Body of the order confirmation email.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderConfirmation {
    pub order_uuid: Uuid,
    pub email: String,
    pub customer_name: String,
    pub language: Language,
    pub subject: String,
    pub items: Vec<ConfirmationLine>,
    pub subtotal: i64,
    pub vat: i64,
    pub shipping: i64,
    pub total: i64,
    pub currency: String,
    pub shipping_method: String,
}

/// Body of the order status update email.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStatusNotice {
    pub order_uuid: Uuid,
    pub email: String,
    pub customer_name: String,
    pub language: Language,
    pub subject: String,
    pub status: String,
    pub tracking_number: Option<String>,
}

/// First eight hex digits, used as the customer-facing order reference.
#[must_use]
pub fn order_reference(order: Uuid) -> String {
    let mut reference = order.simple().to_string();
    reference.truncate(8);
    reference.to_uppercase()
}

#[must_use]
pub fn confirmation_subject(language: Language, order: Uuid) -> String {
    let reference = order_reference(order);

    match language {
        Language::En => format!("Your Krua order {reference} is confirmed"),
        Language::Th => format!("ยืนยันคำสั่งซื้อ {reference} จากครัว"),
    }
}

#[must_use]
pub fn shipped_subject(language: Language, order: Uuid) -> String {
    let reference = order_reference(order);

    match language {
        Language::En => format!("Your Krua order {reference} has shipped"),
        Language::Th => format!("คำสั่งซื้อ {reference} ของคุณถูกจัดส่งแล้ว"),
    }
}
