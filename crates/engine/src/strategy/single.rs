//! Fixed single-value generation for deterministic tests

use super::{check_quantity, ItemIdGenerationStrategy};
use sctid_core::{ComponentCategory, IdError, Namespace, Result};

/// Returns one predetermined item id, whatever the request
#[derive(Debug, Clone)]
pub struct SingleItemIdStrategy {
    item_id: String,
}

impl SingleItemIdStrategy {
    /// Always answer with `item_id`
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
        }
    }
}

impl ItemIdGenerationStrategy for SingleItemIdStrategy {
    fn generate_item_ids(
        &self,
        _namespace: &Namespace,
        _category: ComponentCategory,
        quantity: usize,
        _attempt: u32,
    ) -> Result<Vec<String>> {
        check_quantity(quantity)?;
        if quantity != 1 {
            return Err(IdError::invalid_argument(format!(
                "single id strategy can only produce one id, {} requested",
                quantity
            )));
        }
        Ok(vec![self.item_id.clone()])
    }

    fn name(&self) -> &'static str {
        "single"
    }
}
