use serde::{Deserialize, Serialize};

/// A station as resolved from the source catalog.
///
/// `id` is the raw source name used for every lookup; `display_name` only
/// appears in reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub display_name: String,
}

impl Station {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }

    /// Derive the display name by stripping `prefix` and capitalising
    pub fn from_source_name(id: &str, prefix: &str) -> Self {
        Self::new(id, display_name(id, prefix))
    }
}

pub fn display_name(id: &str, prefix: &str) -> String {
    let stripped = id.strip_prefix(prefix).unwrap_or(id);
    let mut chars = stripped.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
