use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;
use crate::store::Document;

/// A product category. `category_name` is unique.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub category_name: String,
    pub description: String,
}

impl Document for Category {
    const COLLECTION: &'static str = catalog::CATEGORIES.name;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Input for creating a category.
#[derive(Clone, Debug)]
pub struct NewCategory {
    pub category_name: String,
    pub description: String,
}

/// Partial update of a category. `None` fields are left unchanged.
#[derive(Clone, Debug, Default)]
pub struct CategoryPatch {
    pub category_name: Option<String>,
    pub description: Option<String>,
}
