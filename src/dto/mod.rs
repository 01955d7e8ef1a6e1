//! Request bodies accepted by the write endpoints.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::TransactionStatus;
use crate::errors::ServiceError;

/// A quantity as typed into a form: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum QuantityInput {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl QuantityInput {
    /// Parses the input as a whole number of at least `min`.
    pub fn parse(&self, field: &str, min: i32) -> Result<i32, ServiceError> {
        let invalid =
            || ServiceError::ValidationError(format!("{} must be a whole number", field));
        let value: i64 = match self {
            QuantityInput::Integer(n) => *n,
            QuantityInput::Float(f) if f.is_finite() && f.fract() == 0.0 => *f as i64,
            QuantityInput::Float(_) => return Err(invalid()),
            QuantityInput::Text(s) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        };
        let value = i32::try_from(value).map_err(|_| invalid())?;
        if value < min {
            return Err(ServiceError::ValidationError(format!(
                "{} must be at least {}",
                field, min
            )));
        }
        Ok(value)
    }
}

impl From<i32> for QuantityInput {
    fn from(value: i32) -> Self {
        QuantityInput::Integer(i64::from(value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Product name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,
    #[validate(length(max = 50))]
    pub color: Option<String>,
    #[schema(value_type = Object, example = 10)]
    pub quantity: QuantityInput,
    #[schema(value_type = String, example = "12000")]
    #[validate(custom = "crate::entities::validate_money")]
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateRejectedItemRequest {
    #[validate(length(min = 1, max = 255, message = "Product name is required"))]
    pub product_name: String,
    #[schema(value_type = Object, example = 3)]
    pub quantity: QuantityInput,
    #[validate(length(min = 1, max = 1000, message = "Reason is required"))]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateFoodConditionRequest {
    #[validate(length(min = 1, max = 255, message = "Product name is required"))]
    pub product_name: String,
    #[validate(length(min = 1, max = 64, message = "Condition is required"))]
    pub condition: String,
    pub fit_for_processing: bool,
    /// Defaults to now
    pub inspection_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTransactionRequest {
    #[validate(length(min = 1, max = 255, message = "Product name is required"))]
    pub product_name: String,
    #[schema(value_type = Object, example = 5)]
    pub quantity: QuantityInput,
    #[schema(value_type = String, example = "60000")]
    #[validate(custom = "crate::entities::validate_money")]
    pub amount: Decimal,
    /// Defaults to `pending`
    pub status: Option<TransactionStatus>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    /// Defaults to now
    pub transaction_date: Option<DateTime<Utc>>,
}
