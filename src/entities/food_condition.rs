use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Quality inspection of a material lot.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, Validate, ToSchema)]
#[sea_orm(table_name = "food_conditions")]
#[schema(as = FoodCondition)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(min = 1, max = 255, message = "Product name is required"))]
    pub product_name: String,

    /// Inspector's grading, free text from a fixed form list
    #[validate(length(min = 1, max = 64, message = "Condition is required"))]
    pub condition: String,

    /// Whether the lot may proceed into production
    pub fit_for_processing: bool,

    pub inspection_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
