//! Meeting venues (spec.md §3).

use serde::{Deserialize, Serialize};

/// A candidate meeting location. Higher `quality` is preferred by the
/// scheduler (spec.md §4.6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: i64,
    pub description: String,
    pub route: Option<String>,
    pub photo_key: Option<String>,
    pub quality: i32,
}
