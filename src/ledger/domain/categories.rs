use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A category that has not been persisted yet.
///
/// The ID is generated up front so that a batch of categories can be matched
/// back to the rows the store returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCategory {
    id: Uuid,
    title: String,
}

impl NewCategory {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// A persisted category. Categories are identified by their title, so there is
/// at most one category for each distinct title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
