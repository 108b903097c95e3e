//! Records produced by a harvest and the shape they take on disk.
//!
//! Missing fields are `None` in memory. The placeholder strings the output
//! format expects are substituted only when a record is serialized.
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Written in place of an author name that could not be read.
pub const MISSING_AUTHOR: &str = "Нет имени";
/// Written in place of a review body that could not be read.
pub const MISSING_TEXT: &str = "Нет текста";

/// One review as shown on the listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Review {
    #[serde(serialize_with = "author_or_placeholder")]
    pub author: Option<String>,
    /// Date text exactly as displayed ("3 weeks ago", "15.03.2023").
    #[serde(rename = "date", serialize_with = "text_or_empty")]
    pub raw_date: Option<String>,
    /// Star rating, 0 when it could not be read.
    pub rating: u8,
    #[serde(serialize_with = "body_or_placeholder")]
    pub text: Option<String>,
    /// Owner reply; `None` when the business never answered.
    #[serde(serialize_with = "text_or_empty")]
    pub response_text: Option<String>,
}

/// A review plus the absolute time its date text resolved to.
///
/// Only exists while a harvest is running; [`crate::finalize::finalize`]
/// orders by `resolved_at` and then drops it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestedReview {
    pub review: Review,
    pub resolved_at: DateTime<Utc>,
}

/// Aggregate figures from the business card. Each one is read independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings_count: Option<u64>,
}

/// Everything collected for one business in one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BusinessResult {
    pub card_data: CardMetadata,
    pub reviews: Vec<Review>,
}

fn or_placeholder<S: Serializer>(
    value: &Option<String>,
    placeholder: &str,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(placeholder))
}

fn author_or_placeholder<S: Serializer>(v: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    or_placeholder(v, MISSING_AUTHOR, s)
}

fn body_or_placeholder<S: Serializer>(v: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    or_placeholder(v, MISSING_TEXT, s)
}

fn text_or_empty<S: Serializer>(v: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    or_placeholder(v, "", s)
}
