use uuid::Uuid;

use crate::{
    api::error,
    modules::property::{
        model::{NewProperty, PropertySearch, UpdatePropertyModel},
        schema::{Photo, PropertyEntity, PropertyImagesRow, PropertyStatus},
    },
};

#[async_trait::async_trait]
pub trait PropertyRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<PropertyEntity>, error::SystemError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<PropertyEntity>, error::SystemError>;

    /// Returns one page of matches and the total number of matches
    async fn search(
        &self,
        search: &PropertySearch,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PropertyEntity>, i64), error::SystemError>;

    async fn create(&self, property: &NewProperty) -> Result<PropertyEntity, error::SystemError>;
    async fn update(
        &self,
        id: &Uuid,
        changes: &UpdatePropertyModel,
    ) -> Result<PropertyEntity, error::SystemError>;
    async fn set_status(
        &self,
        id: &Uuid,
        status: PropertyStatus,
    ) -> Result<PropertyEntity, error::SystemError>;

    /// Writes both image columns at once
    async fn set_images(
        &self,
        id: &Uuid,
        images: &[String],
        photos: &[Photo],
    ) -> Result<PropertyEntity, error::SystemError>;

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError>;

    async fn list_image_rows(&self) -> Result<Vec<PropertyImagesRow>, error::SystemError>;
}
