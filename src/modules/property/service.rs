use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{
    error,
    success::{page_window, Paginated},
};
use crate::constants::PLACEHOLDER_IMAGE_URL;
use crate::modules::backup::{model::PropertyImageSnapshot, store::BackupStore};
use crate::modules::media::{
    reference::{normalize_reference, photo_url},
    storage::ImageStore,
};
use crate::modules::property::{
    model::{
        CreatePropertyModel, NewProperty, PhotoResponse, PropertyQuery, PropertyResponse,
        PropertySearch, UpdatePropertyModel,
    },
    repository::PropertyRepository,
    schema::{Photo, PropertyEntity, PropertyStatus},
};
use crate::modules::user::schema::UserRole;
use crate::utils::slugify;

pub fn make_slug(title: &str, id_hint: &Uuid) -> String {
    let base = slugify(title);
    let base = if base.is_empty() { "property".to_string() } else { base };
    let suffix = id_hint.simple().to_string();
    format!("{}-{}", base, &suffix[suffix.len() - 8..])
}

#[derive(Clone)]
pub struct PropertyService {
    repo: Arc<dyn PropertyRepository + Send + Sync>,
    images: Arc<ImageStore>,
    backups: Arc<BackupStore>,
}

impl PropertyService {
    pub fn with_dependencies(
        repo: Arc<dyn PropertyRepository + Send + Sync>,
        images: Arc<ImageStore>,
        backups: Arc<BackupStore>,
    ) -> Self {
        info!("PropertyService initialized with dependencies");
        PropertyService { repo, images, backups }
    }

    /// Canonical photos, falling back to the legacy column for rows that predate `photos`.
    /// Files missing on disk are shown as the placeholder.
    async fn to_response(&self, entity: PropertyEntity) -> PropertyResponse {
        let photos: Vec<Photo> = if entity.photos.0.is_empty() {
            entity
                .images
                .iter()
                .filter_map(|raw| normalize_reference(raw))
                .enumerate()
                .map(|(order, filename)| Photo {
                    filename,
                    alt_text: entity.title.clone(),
                    order: order as i32,
                })
                .collect()
        } else {
            let mut photos = entity.photos.0.clone();
            photos.sort_by_key(|p| p.order);
            photos
        };

        let mut resolved = Vec::with_capacity(photos.len());
        for photo in photos {
            let url = if self.images.exists(&photo.filename).await {
                photo_url(&photo.filename)
            } else {
                PLACEHOLDER_IMAGE_URL.to_string()
            };
            resolved.push(PhotoResponse {
                filename: photo.filename,
                alt_text: photo.alt_text,
                order: photo.order,
                url,
            });
        }

        let cover_image = resolved
            .iter()
            .map(|p| p.url.clone())
            .find(|url| url != PLACEHOLDER_IMAGE_URL)
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string());

        PropertyResponse::new(entity, resolved, cover_image)
    }

    async fn to_page(
        &self,
        search: PropertySearch,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Paginated<PropertyResponse>, error::SystemError> {
        let (page, limit, offset) = page_window(page, limit, 12);
        let (entities, total) = self.repo.search(&search, limit, offset).await?;
        let mut items = Vec::with_capacity(entities.len());
        for entity in entities {
            items.push(self.to_response(entity).await);
        }
        Ok(Paginated::new(items, total, page, limit))
    }

    pub async fn list_published(
        &self,
        query: &PropertyQuery,
    ) -> Result<Paginated<PropertyResponse>, error::SystemError> {
        let search = PropertySearch::from_query(query).published();
        self.to_page(search, query.page, query.limit).await
    }

    pub async fn list_all(
        &self,
        query: &PropertyQuery,
    ) -> Result<Paginated<PropertyResponse>, error::SystemError> {
        self.to_page(PropertySearch::from_query(query), query.page, query.limit).await
    }

    pub async fn list_mine(
        &self,
        owner_id: Uuid,
        query: &PropertyQuery,
    ) -> Result<Paginated<PropertyResponse>, error::SystemError> {
        let search = PropertySearch { owner_id: Some(owner_id), ..PropertySearch::from_query(query) };
        self.to_page(search, query.page, query.limit).await
    }

    pub async fn get_published(&self, id: Uuid) -> Result<PropertyResponse, error::SystemError> {
        match self.repo.find_by_id(&id).await? {
            Some(entity) if entity.status == PropertyStatus::Published => {
                Ok(self.to_response(entity).await)
            }
            _ => Err(error::SystemError::not_found("Property not found")),
        }
    }

    pub async fn get_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<PropertyResponse, error::SystemError> {
        match self.repo.find_by_slug(slug).await? {
            Some(entity) if entity.status == PropertyStatus::Published => {
                Ok(self.to_response(entity).await)
            }
            _ => Err(error::SystemError::not_found("Property not found")),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<PropertyResponse, error::SystemError> {
        let entity = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Property not found"))?;
        Ok(self.to_response(entity).await)
    }

    /// Staff listings default to published; user submissions always wait for approval.
    pub async fn create(
        &self,
        actor_id: Uuid,
        actor_role: UserRole,
        model: CreatePropertyModel,
    ) -> Result<PropertyResponse, error::SystemError> {
        let status = if actor_role.is_staff() {
            model.status.unwrap_or(PropertyStatus::Published)
        } else {
            PropertyStatus::PendingApproval
        };

        let new_property = NewProperty {
            slug: make_slug(&model.title, &Uuid::now_v7()),
            title: model.title,
            description: model.description,
            property_type: model.property_type,
            listing_type: model.listing_type,
            price: model.price,
            currency: model.currency.map(|c| c.to_uppercase()).unwrap_or_else(|| "USD".into()),
            city: model.city,
            district: model.district,
            address: model.address,
            bedrooms: model.bedrooms,
            bathrooms: model.bathrooms,
            area_sqm: model.area_sqm,
            status,
            featured: actor_role.is_staff() && model.featured,
            owner_id: Some(actor_id),
            agent_id: if actor_role.is_staff() { model.agent_id } else { None },
        };

        let entity = self.repo.create(&new_property).await?;
        info!("Property {} created by {} with status {:?}", entity.id, actor_id, entity.status);
        Ok(self.to_response(entity).await)
    }

    pub async fn update(
        &self,
        id: Uuid,
        mut changes: UpdatePropertyModel,
    ) -> Result<PropertyResponse, error::SystemError> {
        if changes.is_empty() {
            return Err(error::SystemError::bad_request("No fields to update"));
        }
        changes.currency = changes.currency.map(|c| c.to_uppercase());
        let entity = self.repo.update(&id, &changes).await?;
        Ok(self.to_response(entity).await)
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        status: PropertyStatus,
    ) -> Result<PropertyResponse, error::SystemError> {
        let entity = self.repo.set_status(&id, status).await?;
        info!("Property {} status set to {:?}", id, status);
        Ok(self.to_response(entity).await)
    }

    /// Snapshots the image columns, removes the row, then the files it referenced.
    pub async fn delete(&self, id: Uuid) -> Result<(), error::SystemError> {
        let entity = self
            .repo
            .find_by_id(&id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Property not found"))?;

        self.backups
            .write_property_snapshot(&PropertyImageSnapshot::capture(
                entity.id,
                &entity.title,
                &entity.images,
                &entity.photos.0,
                "delete_property",
            ))
            .await?;

        if !self.repo.delete(&id).await? {
            return Err(error::SystemError::not_found("Property not found"));
        }

        let mut names: Vec<String> = entity.photos.0.iter().map(|p| p.filename.clone()).collect();
        names.extend(entity.images.iter().filter_map(|raw| normalize_reference(raw)));
        names.sort();
        names.dedup();
        for name in names {
            if let Err(e) = self.images.remove(&name).await {
                log::warn!("Could not remove image {} of deleted property {}: {}", name, id, e);
            }
        }

        info!("Property {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use sqlx::types::Json;

    use super::*;
    use crate::modules::property::model::NewProperty;
    use crate::modules::property::schema::{ListingType, PropertyImagesRow};

    /// In-memory stand-in for the Postgres repository.
    #[derive(Default)]
    pub struct MemoryPropertyRepo {
        pub rows: Mutex<HashMap<Uuid, PropertyEntity>>,
    }

    pub fn entity(title: &str, status: PropertyStatus) -> PropertyEntity {
        let id = Uuid::now_v7();
        PropertyEntity {
            id,
            title: title.to_string(),
            slug: make_slug(title, &id),
            description: String::new(),
            property_type: "villa".into(),
            listing_type: ListingType::Sale,
            price: 250_000,
            currency: "USD".into(),
            city: "Da Nang".into(),
            district: None,
            address: None,
            bedrooms: 3,
            bathrooms: 2,
            area_sqm: Some(120.0),
            images: Vec::new(),
            photos: Json(Vec::new()),
            status,
            featured: false,
            owner_id: None,
            agent_id: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    impl MemoryPropertyRepo {
        pub fn with(rows: Vec<PropertyEntity>) -> Self {
            let repo = Self::default();
            {
                let mut map = repo.rows.lock().unwrap();
                for row in rows {
                    map.insert(row.id, row);
                }
            }
            repo
        }

        pub fn get(&self, id: &Uuid) -> Option<PropertyEntity> {
            self.rows.lock().unwrap().get(id).cloned()
        }
    }

    #[async_trait::async_trait]
    impl PropertyRepository for MemoryPropertyRepo {
        async fn find_by_id(&self, id: &Uuid) -> Result<Option<PropertyEntity>, error::SystemError> {
            Ok(self.get(id))
        }

        async fn find_by_slug(
            &self,
            slug: &str,
        ) -> Result<Option<PropertyEntity>, error::SystemError> {
            Ok(self.rows.lock().unwrap().values().find(|p| p.slug == slug).cloned())
        }

        async fn search(
            &self,
            search: &PropertySearch,
            limit: i64,
            offset: i64,
        ) -> Result<(Vec<PropertyEntity>, i64), error::SystemError> {
            let mut matches: Vec<PropertyEntity> = self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|p| search.status.map_or(true, |s| p.status == s))
                .filter(|p| search.owner_id.map_or(true, |o| p.owner_id == Some(o)))
                .filter(|p| search.min_price.map_or(true, |m| p.price >= m))
                .filter(|p| search.max_price.map_or(true, |m| p.price <= m))
                .cloned()
                .collect();
            matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let total = matches.len() as i64;
            let page = matches.into_iter().skip(offset as usize).take(limit as usize).collect();
            Ok((page, total))
        }

        async fn create(
            &self,
            property: &NewProperty,
        ) -> Result<PropertyEntity, error::SystemError> {
            let mut row = entity(&property.title, property.status);
            row.slug = property.slug.clone();
            row.price = property.price;
            row.currency = property.currency.clone();
            row.featured = property.featured;
            row.owner_id = property.owner_id;
            row.agent_id = property.agent_id;
            self.rows.lock().unwrap().insert(row.id, row.clone());
            Ok(row)
        }

        async fn update(
            &self,
            id: &Uuid,
            changes: &UpdatePropertyModel,
        ) -> Result<PropertyEntity, error::SystemError> {
            let mut rows = self.rows.lock().unwrap();
            let row =
                rows.get_mut(id).ok_or_else(|| error::SystemError::not_found("Property not found"))?;
            if let Some(title) = &changes.title {
                row.title = title.clone();
            }
            if let Some(price) = changes.price {
                row.price = price;
            }
            if let Some(currency) = &changes.currency {
                row.currency = currency.clone();
            }
            if let Some(district) = &changes.district {
                row.district = district.clone();
            }
            Ok(row.clone())
        }

        async fn set_status(
            &self,
            id: &Uuid,
            status: PropertyStatus,
        ) -> Result<PropertyEntity, error::SystemError> {
            let mut rows = self.rows.lock().unwrap();
            let row =
                rows.get_mut(id).ok_or_else(|| error::SystemError::not_found("Property not found"))?;
            row.status = status;
            Ok(row.clone())
        }

        async fn set_images(
            &self,
            id: &Uuid,
            images: &[String],
            photos: &[Photo],
        ) -> Result<PropertyEntity, error::SystemError> {
            let mut rows = self.rows.lock().unwrap();
            let row =
                rows.get_mut(id).ok_or_else(|| error::SystemError::not_found("Property not found"))?;
            row.images = images.to_vec();
            row.photos = Json(photos.to_vec());
            Ok(row.clone())
        }

        async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
            Ok(self.rows.lock().unwrap().remove(id).is_some())
        }

        async fn list_image_rows(&self) -> Result<Vec<PropertyImagesRow>, error::SystemError> {
            let mut rows: Vec<PropertyImagesRow> = self
                .rows
                .lock()
                .unwrap()
                .values()
                .map(|p| PropertyImagesRow {
                    id: p.id,
                    title: p.title.clone(),
                    images: p.images.clone(),
                    photos: p.photos.clone(),
                })
                .collect();
            rows.sort_by_key(|r| r.id);
            Ok(rows)
        }
    }

    async fn service(
        rows: Vec<PropertyEntity>,
    ) -> (tempfile::TempDir, Arc<MemoryPropertyRepo>, PropertyService) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(MemoryPropertyRepo::with(rows));
        let images = Arc::new(ImageStore::open(dir.path().join("uploads")).await.unwrap());
        let backups = Arc::new(BackupStore::open(dir.path().join("backups")).await.unwrap());
        let service = PropertyService::with_dependencies(repo.clone(), images, backups);
        (dir, repo, service)
    }

    #[test]
    fn slug_has_title_and_random_suffix() {
        let id = Uuid::parse_str("0190b2c4-7d1e-7aa0-9d1b-3f1f8e0e1a2b").unwrap();
        assert_eq!(make_slug("Sea View Villa", &id), "sea-view-villa-8e0e1a2b");
        assert_eq!(make_slug("***", &id), "property-8e0e1a2b");
    }

    #[tokio::test]
    async fn public_reads_hide_pending_listings() {
        let pending = entity("Pending flat", PropertyStatus::PendingApproval);
        let published = entity("Published villa", PropertyStatus::Published);
        let (pending_id, published_id) = (pending.id, published.id);
        let (_dir, _repo, service) = service(vec![pending, published]).await;

        assert!(service.get_published(published_id).await.is_ok());
        assert!(matches!(
            service.get_published(pending_id).await,
            Err(error::SystemError::NotFound(_))
        ));

        let page = service.list_published(&PropertyQuery::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, published_id);
    }

    #[tokio::test]
    async fn user_submissions_wait_for_approval() {
        let (_dir, _repo, service) = service(vec![]).await;
        let model = CreatePropertyModel {
            title: "My apartment".into(),
            description: String::new(),
            property_type: "apartment".into(),
            listing_type: ListingType::Rent,
            price: 900,
            currency: Some("eur".into()),
            city: "Hanoi".into(),
            district: None,
            address: None,
            bedrooms: 2,
            bathrooms: 1,
            area_sqm: None,
            featured: true,
            agent_id: None,
            status: Some(PropertyStatus::Published),
        };

        let owner = Uuid::now_v7();
        let created = service.create(owner, UserRole::User, model).await.unwrap();
        assert_eq!(created.status, PropertyStatus::PendingApproval);
        assert!(!created.featured);
        assert_eq!(created.currency, "EUR");
        assert_eq!(created.owner_id, Some(owner));
        assert_eq!(created.cover_image, PLACEHOLDER_IMAGE_URL);

        let approved = service.set_status(created.id, PropertyStatus::Published).await.unwrap();
        assert_eq!(approved.status, PropertyStatus::Published);
    }

    #[tokio::test]
    async fn missing_files_render_as_placeholder() {
        let mut row = entity("Villa", PropertyStatus::Published);
        row.photos = Json(vec![
            Photo { filename: "gone.jpg".into(), alt_text: String::new(), order: 0 },
            Photo { filename: "here.jpg".into(), alt_text: "Pool".into(), order: 1 },
        ]);
        let id = row.id;
        let (dir, _repo, service) = service(vec![row]).await;
        tokio::fs::write(dir.path().join("uploads/here.jpg"), b"x").await.unwrap();

        let response = service.get_published(id).await.unwrap();
        assert_eq!(response.photos[0].url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(response.photos[1].url, "/uploads/properties/here.jpg");
        assert_eq!(response.cover_image, "/uploads/properties/here.jpg");
    }

    #[tokio::test]
    async fn legacy_only_rows_still_render() {
        let mut row = entity("Old listing", PropertyStatus::Published);
        row.images = vec!["https://old.example.com/uploads/properties/legacy.png?v=1".into()];
        let id = row.id;
        let (dir, _repo, service) = service(vec![row]).await;
        tokio::fs::write(dir.path().join("uploads/legacy.png"), b"x").await.unwrap();

        let response = service.get_published(id).await.unwrap();
        assert_eq!(response.photos.len(), 1);
        assert_eq!(response.photos[0].filename, "legacy.png");
        assert_eq!(response.cover_image, "/uploads/properties/legacy.png");
    }

    #[tokio::test]
    async fn delete_snapshots_then_removes_files() {
        let mut row = entity("Villa", PropertyStatus::Published);
        row.photos =
            Json(vec![Photo { filename: "a.jpg".into(), alt_text: String::new(), order: 0 }]);
        row.images = vec!["/uploads/properties/a.jpg".into()];
        let id = row.id;
        let (dir, repo, service) = service(vec![row]).await;
        tokio::fs::write(dir.path().join("uploads/a.jpg"), b"x").await.unwrap();

        service.delete(id).await.unwrap();

        assert!(repo.get(&id).is_none());
        assert!(!dir.path().join("uploads/a.jpg").exists());
        let backups = BackupStore::open(dir.path().join("backups")).await.unwrap();
        let listed = backups.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        let snapshot = backups.read_property_snapshot(&listed[0].name).await.unwrap();
        assert_eq!(snapshot.reason, "delete_property");
        assert_eq!(snapshot.photos[0].filename, "a.jpg");
    }
}
