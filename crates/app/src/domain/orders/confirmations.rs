//! Order emails.

use tracing::{info, warn};

use crate::{
    domain::orders::{
        models::{ConfirmationOutcome, Order},
        repositories::OrderRecipient,
    },
    notifications::{
        ConfirmationLine, NotificationError, OrderConfirmation, OrderNotifier, OrderStatusNotice,
        confirmation_subject, shipped_subject,
    },
};

pub(crate) fn build_confirmation(order: &Order, recipient: &OrderRecipient) -> OrderConfirmation {
    let language = recipient.language;

    OrderConfirmation {
        order_uuid: order.uuid.into_uuid(),
        email: recipient.email.clone(),
        customer_name: recipient.name.clone(),
        language,
        subject: confirmation_subject(language, order.uuid.into_uuid()),
        items: order
            .items
            .iter()
            .map(|item| ConfirmationLine {
                name: item.product_name.get(language).to_string(),
                sku: item.product_sku.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total: item.line_total,
            })
            .collect(),
        subtotal: order.subtotal,
        vat: order.vat,
        shipping: order.shipping,
        total: order.total,
        currency: order.currency.clone(),
        shipping_method: order.shipping_method.label(language).to_string(),
    }
}

pub(crate) fn build_status_notice(order: &Order, recipient: &OrderRecipient) -> OrderStatusNotice {
    OrderStatusNotice {
        order_uuid: order.uuid.into_uuid(),
        email: recipient.email.clone(),
        customer_name: recipient.name.clone(),
        language: recipient.language,
        subject: shipped_subject(recipient.language, order.uuid.into_uuid()),
        status: order.status.to_string(),
        tracking_number: order.tracking_number.clone(),
    }
}

/// Send a confirmation, turning any failure into an outcome instead of an error.
pub(crate) async fn dispatch_confirmation(
    notifier: &dyn OrderNotifier,
    confirmation: &OrderConfirmation,
) -> ConfirmationOutcome {
    match notifier.send_order_confirmation(confirmation).await {
        Ok(()) => {
            info!(order_uuid = %confirmation.order_uuid, "order confirmation sent");

            ConfirmationOutcome::Sent
        }
        Err(NotificationError::Disabled) => {
            info!(
                order_uuid = %confirmation.order_uuid,
                "notifications disabled; confirmation left pending"
            );

            ConfirmationOutcome::Disabled
        }
        Err(error) => {
            let transient = error.is_transient();

            warn!(
                order_uuid = %confirmation.order_uuid,
                transient,
                error = %error,
                "order confirmation failed; left pending for retry"
            );

            ConfirmationOutcome::Failed { transient }
        }
    }
}
