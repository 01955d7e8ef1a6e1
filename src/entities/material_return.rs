use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ConnectionTrait};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Prefix of every generated return number.
pub const RETURN_NUMBER_PREFIX: &str = "RET-";

/// Return status. Only `Pending` is ever written by this service; approval and
/// rejection are recorded by an external reviewer and are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ReturnStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl ReturnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Pending => "pending",
            ReturnStatus::Approved => "approved",
            ReturnStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReturnStatus::Pending)
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to send material back to the supplier.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate, ToSchema)]
#[sea_orm(table_name = "returns")]
#[schema(as = MaterialReturn)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// `RET-<unix millis>`
    #[sea_orm(unique)]
    #[validate(custom = "validate_return_number")]
    pub return_number: String,

    #[validate(length(min = 1, max = 255, message = "Product name is required"))]
    pub product_name: String,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,

    #[validate(length(min = 1, max = 1000, message = "Reason cannot be empty"))]
    pub reason: String,

    pub status: ReturnStatus,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let model: Model = self.clone().try_into().map_err(|_| {
            DbErr::Custom("Failed to convert ActiveModel to Model for validation".to_string())
        })?;

        if let Err(err) = model.validate() {
            return Err(DbErr::Custom(format!("Validation error: {}", err)));
        }

        Ok(self)
    }
}

/// Issues `RET-<millis>` numbers that never repeat within the process.
///
/// Two returns created in the same millisecond get consecutive numbers.
#[derive(Debug, Default)]
pub struct ReturnNumbers {
    last: AtomicI64,
}

static RETURN_NUMBERS: ReturnNumbers = ReturnNumbers::new();

impl ReturnNumbers {
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    /// Next number at or after `created_at`, strictly above the last one issued.
    pub fn issue(&self, created_at: DateTime<Utc>) -> String {
        let millis = created_at.timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(millis.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        let issued = millis.max(previous.saturating_add(1));
        format!("{}{}", RETURN_NUMBER_PREFIX, issued)
    }
}

/// Process-wide return number for a creation instant.
pub fn next_return_number(created_at: DateTime<Utc>) -> String {
    RETURN_NUMBERS.issue(created_at)
}

fn validate_return_number(value: &str) -> Result<(), ValidationError> {
    let digits = value.strip_prefix(RETURN_NUMBER_PREFIX).unwrap_or("");
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("return_number");
        err.message = Some("Return number must look like RET-<digits>".into());
        return Err(err);
    }
    Ok(())
}
