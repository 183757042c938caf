use serde::{Deserialize, Serialize};

use super::NumericValue;

/// Order as submitted by the checkout page. Every field is optional here so
/// that missing fields produce a 400 with a readable message instead of a
/// deserialization error.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitOrder {
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub customer: Option<CustomerInput>,
    #[serde(default)]
    pub items: Option<Vec<OrderItem>>,
    #[serde(default)]
    pub total: Option<NumericValue>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomerInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// One line of a submitted order. Quantity and price are display values for
/// the confirmation emails and may arrive as numbers or numeric strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub qty: NumericValue,
    pub price: NumericValue,
}

/// A validated order, ready for email composition.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub reference: String,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub total: NumericValue,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub address: String,
    pub zip: String,
    pub city: String,
    pub country: String,
    pub phone: Option<String>,
}

/// Why a submitted order was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderValidationError {
    MissingFields,
    MissingCustomerIdentity,
    EmptyItems,
}

impl OrderValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingFields => "Missing required fields: ref, customer, items, total, currency",
            Self::MissingCustomerIdentity => "Customer name and email are required",
            Self::EmptyItems => "Items must be a non-empty array",
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SubmitOrder {
    pub fn validate(self) -> Result<Order, OrderValidationError> {
        let (Some(reference), Some(customer), Some(items), Some(total), Some(currency)) = (
            present(self.reference),
            self.customer,
            self.items,
            self.total.filter(|t| !t.is_empty()),
            present(self.currency),
        ) else {
            return Err(OrderValidationError::MissingFields);
        };

        let (Some(name), Some(email)) = (present(customer.name), present(customer.email)) else {
            return Err(OrderValidationError::MissingCustomerIdentity);
        };

        if items.is_empty() {
            return Err(OrderValidationError::EmptyItems);
        }

        Ok(Order {
            reference,
            customer: Customer {
                name,
                email,
                address: customer.address.unwrap_or_default(),
                zip: customer.zip.unwrap_or_default(),
                city: customer.city.unwrap_or_default(),
                country: customer.country.unwrap_or_default(),
                phone: present(customer.phone),
            },
            items,
            total,
            currency,
        })
    }
}
