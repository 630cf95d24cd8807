use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub description: String,
    /// Tenths of a star, 0..=50.
    pub rating: i64,
    pub image_url: String,
    pub popular_tag: Option<String>,
    pub recommended_days: Option<String>,
    pub price_from: Option<i64>,
    pub featured: bool,
}

#[derive(Debug, Clone)]
pub struct NewDestination {
    pub name: String,
    pub country: String,
    pub description: String,
    pub rating: i64,
    pub image_url: String,
    pub popular_tag: Option<String>,
    pub recommended_days: Option<String>,
    pub price_from: Option<i64>,
    pub featured: bool,
}
