//! Product sample entity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::entity::{Entity, EntityId};
use crate::config::{PRODUCTS_TABLE, PRODUCT_STATUS_ACTIVE, PRODUCT_STATUS_INACTIVE, UNSAVED_ID};

/// Catalog product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Product {
    pub id: EntityId,
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,
    pub date: NaiveDate,
    /// 0 = inactive, 1 = active
    #[validate(range(min = 0, max = 1, message = "Status must be 0 or 1"))]
    pub status: i32,
}

impl Product {
    /// Create an unsaved, active product
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            date,
            status: PRODUCT_STATUS_ACTIVE,
        }
    }

    pub fn with_status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == PRODUCT_STATUS_ACTIVE
    }

    pub fn deactivate(&mut self) {
        self.status = PRODUCT_STATUS_INACTIVE;
    }
}

impl Entity for Product {
    const TABLE: &'static str = PRODUCTS_TABLE;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}
