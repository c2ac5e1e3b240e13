use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::property::schema::{ListingType, Photo, PropertyEntity, PropertyStatus};
use crate::utils::double_option;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePropertyModel {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters long"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "Property type cannot be empty"))]
    pub property_type: String,
    pub listing_type: ListingType,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: i64,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: Option<String>,
    #[validate(length(min = 1, message = "City cannot be empty"))]
    pub city: String,
    pub district: Option<String>,
    pub address: Option<String>,
    #[validate(range(min = 0, max = 100))]
    #[serde(default)]
    pub bedrooms: i32,
    #[validate(range(min = 0, max = 100))]
    #[serde(default)]
    pub bathrooms: i32,
    #[validate(range(min = 0.0))]
    pub area_sqm: Option<f64>,
    #[serde(default)]
    pub featured: bool,
    pub agent_id: Option<Uuid>,
    pub status: Option<PropertyStatus>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePropertyModel {
    #[validate(length(min = 3, max = 200, message = "Title must be 3-200 characters long"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Property type cannot be empty"))]
    pub property_type: Option<String>,
    pub listing_type: Option<ListingType>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: Option<i64>,
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: Option<String>,
    #[validate(length(min = 1, message = "City cannot be empty"))]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub district: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    #[validate(range(min = 0, max = 100))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub bathrooms: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub area_sqm: Option<Option<f64>>,
    pub featured: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub agent_id: Option<Option<Uuid>>,
}

impl UpdatePropertyModel {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.property_type.is_none()
            && self.listing_type.is_none()
            && self.price.is_none()
            && self.currency.is_none()
            && self.city.is_none()
            && self.district.is_none()
            && self.address.is_none()
            && self.bedrooms.is_none()
            && self.bathrooms.is_none()
            && self.area_sqm.is_none()
            && self.featured.is_none()
            && self.agent_id.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusModel {
    pub status: PropertyStatus,
}

#[derive(Debug, Default, Clone, Deserialize, Validate)]
pub struct PropertyQuery {
    pub city: Option<String>,
    pub listing_type: Option<ListingType>,
    pub property_type: Option<String>,
    #[validate(range(min = 0))]
    pub min_price: Option<i64>,
    #[validate(range(min = 0))]
    pub max_price: Option<i64>,
    #[validate(range(min = 0))]
    pub min_bedrooms: Option<i32>,
    pub featured: Option<bool>,
    #[validate(length(max = 100))]
    pub q: Option<String>,
    pub status: Option<PropertyStatus>,
    #[validate(range(min = 1, max = 100000))]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

/// Filters understood by the repository.
#[derive(Debug, Default, Clone)]
pub struct PropertySearch {
    pub status: Option<PropertyStatus>,
    pub owner_id: Option<Uuid>,
    pub city: Option<String>,
    pub listing_type: Option<ListingType>,
    pub property_type: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_bedrooms: Option<i32>,
    pub featured: Option<bool>,
    pub text: Option<String>,
}

impl PropertySearch {
    pub fn from_query(query: &PropertyQuery) -> Self {
        let non_blank = |v: &Option<String>| {
            v.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        PropertySearch {
            status: query.status,
            owner_id: None,
            city: non_blank(&query.city),
            listing_type: query.listing_type,
            property_type: non_blank(&query.property_type),
            min_price: query.min_price,
            max_price: query.max_price,
            min_bedrooms: query.min_bedrooms,
            featured: query.featured,
            text: non_blank(&query.q),
        }
    }

    pub fn published(mut self) -> Self {
        self.status = Some(PropertyStatus::Published);
        self
    }
}

pub struct NewProperty {
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
    pub status: PropertyStatus,
    pub featured: bool,
    pub owner_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    pub filename: String,
    pub alt_text: String,
    pub order: i32,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PropertyResponse {
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
    pub cover_image: String,
    pub photos: Vec<PhotoResponse>,
    pub status: PropertyStatus,
    pub featured: bool,
    pub owner_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl PropertyResponse {
    pub fn new(entity: PropertyEntity, photos: Vec<PhotoResponse>, cover_image: String) -> Self {
        PropertyResponse {
            id: entity.id,
            title: entity.title,
            slug: entity.slug,
            description: entity.description,
            property_type: entity.property_type,
            listing_type: entity.listing_type,
            price: entity.price,
            currency: entity.currency,
            city: entity.city,
            district: entity.district,
            address: entity.address,
            bedrooms: entity.bedrooms,
            bathrooms: entity.bathrooms,
            area_sqm: entity.area_sqm,
            cover_image,
            photos,
            status: entity.status,
            featured: entity.featured,
            owner_id: entity.owner_id,
            agent_id: entity.agent_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoList {
    pub photos: Vec<Photo>,
    pub images: Vec<String>,
}
