use serde::{Deserialize, Serialize};
use sqlx::{
    prelude::{FromRow, Type},
    types::Json,
};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "property_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Published,
    PendingApproval,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "listing_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Sale,
    Rent,
}

/// One entry of the `photos` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub filename: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PropertyEntity {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub property_type: String,
    pub listing_type: ListingType,
    pub price: i64,
    pub currency: String,
    pub city: String,
    pub district: Option<String>,
    pub address: Option<String>,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area_sqm: Option<f64>,
    /// Legacy image references, kept in sync with `photos`
    pub images: Vec<String>,
    pub photos: Json<Vec<Photo>>,
    pub status: PropertyStatus,
    pub featured: bool,
    pub owner_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// The image columns of a property, used by the consistency scan and snapshots.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PropertyImagesRow {
    pub id: Uuid,
    pub title: String,
    pub images: Vec<String>,
    pub photos: Json<Vec<Photo>>,
}
