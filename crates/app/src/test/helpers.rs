//! Test Helpers

use krua::language::Language;

use crate::domain::{
    customers::models::{CustomerUuid, NewCustomer},
    localized::LocalizedText,
    orders::models::Address,
    products::models::{NewProduct, ProductUuid},
};

pub(crate) fn new_product(uuid: ProductUuid, sku: &str, price: u64, stock: u32) -> NewProduct {
    NewProduct {
        uuid,
        sku: sku.to_string(),
        name: LocalizedText::new("Green curry paste", "พริกแกงเขียวหวาน"),
        description: LocalizedText::new("Hand-pounded, medium heat", ""),
        price,
        category: "pastes".to_string(),
        active: true,
        stock,
    }
}

pub(crate) fn new_customer(uuid: CustomerUuid, email: &str) -> NewCustomer {
    NewCustomer {
        uuid,
        name: "Malee".to_string(),
        email: email.to_string(),
        phone: None,
        preferred_language: Language::En,
    }
}

pub(crate) fn address() -> Address {
    Address {
        recipient: "Malee".to_string(),
        line1: "1 Long Street".to_string(),
        line2: None,
        city: "Cape Town".to_string(),
        province: "Western Cape".to_string(),
        postal_code: "8001".to_string(),
        country: "ZA".to_string(),
        phone: None,
    }
}
