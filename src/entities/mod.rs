//! Storage entities for the material data source.

use rust_decimal::Decimal;
use validator::ValidationError;

pub mod food_condition;
pub mod material_return;
pub mod product;
pub mod rejected_item;
pub mod transaction;

pub use food_condition::Model as FoodConditionModel;
pub use material_return::{Model as ReturnModel, ReturnStatus};
pub use product::Model as ProductModel;
pub use rejected_item::Model as RejectedItemModel;
pub use transaction::{Model as TransactionModel, TransactionStatus};

/// Largest amount a `decimal(14, 2)` money column holds.
pub const MAX_MONEY: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Money fields must be non-negative and fit the money columns.
pub(crate) fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("Amount must be non-negative".into());
        return Err(err);
    }
    if *value > MAX_MONEY {
        let mut err = ValidationError::new("money_range");
        err.message = Some(format!("Amount must not exceed {}", MAX_MONEY).into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn money_ceiling_matches_the_column_precision() {
        assert_eq!(MAX_MONEY, dec!(999999999999.99));
        assert!(validate_money(&MAX_MONEY).is_ok());
        assert!(validate_money(&dec!(1000000000000.00)).is_err());
        assert!(validate_money(&Decimal::MAX).is_err());
        assert!(validate_money(&dec!(-0.01)).is_err());
    }
}
