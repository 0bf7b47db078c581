use serde::{Deserialize, Deserializer, Serialize};

use crate::verifier::{FieldCheck, Validate};

/// A searchable record, identified by its integer `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub creation_date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keywords: Vec<String>,
}

// Older writers stored an unset keyword list as `null`.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Validate for Document {
    fn checks(&self) -> Vec<FieldCheck> {
        vec![FieldCheck::required("ID", &self.id)]
    }
}

/// A page window over a result set.
///
/// `total_documents` is filled in by the store on every search; `page` may
/// be reset to 1 when the requested window lies past the last match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
    #[serde(default)]
    pub total_documents: u64,
}

impl Pagination {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page,
            page_size,
            total_documents: 0,
        }
    }

    /// Record the match count and return the number of documents to skip.
    ///
    /// Windows starting at or past `total` fold back to the first page.
    pub fn settle(&mut self, total: u64) -> u64 {
        self.total_documents = total;

        let offset =
            self.page.saturating_sub(1).saturating_mul(self.page_size);
        if self.page == 0 || offset >= total {
            self.page = 1;
            return 0;
        }
        offset
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 10)
    }
}
