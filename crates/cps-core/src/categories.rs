use serde::{Deserialize, Serialize};

use crate::Marketplace;

/// A category as listed for one marketplace.
///
/// `id` is a 1-based position in the list it came from and is regenerated
/// on every listing. Use `name` as the lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub store: Marketplace,
}

impl Category {
    /// Builds the listing for `store` from already sorted, distinct names.
    #[must_use]
    pub fn enumerate(store: Marketplace, names: Vec<String>) -> Vec<Category> {
        names
            .into_iter()
            .enumerate()
            .map(|(idx, name)| Category {
                id: (idx + 1).to_string(),
                name,
                store,
            })
            .collect()
    }
}
