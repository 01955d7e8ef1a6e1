use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub mod material_repository;

pub use material_repository::{MaterialSource, SeaOrmMaterialSource};

/// Ordering applied to the timestamp column of a table query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    /// Newest first; what every list and export uses unless asked otherwise
    #[default]
    Desc,
}

/// `?order=asc|desc` on list endpoints
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderQuery {
    #[serde(default)]
    pub order: SortDirection,
}

#[cfg(test)]
pub(crate) mod testing;
