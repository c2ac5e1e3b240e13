use sqlx::{types::Json, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    api::error,
    modules::property::{
        model::{NewProperty, PropertySearch, UpdatePropertyModel},
        repository::PropertyRepository,
        schema::{Photo, PropertyEntity, PropertyImagesRow, PropertyStatus},
    },
};

#[derive(Clone)]
pub struct PropertyRepositoryPg {
    pool: sqlx::PgPool,
}

impl PropertyRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, search: &PropertySearch) {
    if let Some(status) = search.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(owner_id) = search.owner_id {
        qb.push(" AND owner_id = ").push_bind(owner_id);
    }
    if let Some(city) = &search.city {
        qb.push(" AND lower(city) = lower(").push_bind(city.clone()).push(")");
    }
    if let Some(listing_type) = search.listing_type {
        qb.push(" AND listing_type = ").push_bind(listing_type);
    }
    if let Some(property_type) = &search.property_type {
        qb.push(" AND lower(property_type) = lower(").push_bind(property_type.clone()).push(")");
    }
    if let Some(min_price) = search.min_price {
        qb.push(" AND price >= ").push_bind(min_price);
    }
    if let Some(max_price) = search.max_price {
        qb.push(" AND price <= ").push_bind(max_price);
    }
    if let Some(min_bedrooms) = search.min_bedrooms {
        qb.push(" AND bedrooms >= ").push_bind(min_bedrooms);
    }
    if let Some(featured) = search.featured {
        qb.push(" AND featured = ").push_bind(featured);
    }
    if let Some(text) = &search.text {
        let pattern = format!("%{}%", text.replace('%', "\\%").replace('_', "\\_"));
        qb.push(" AND title ILIKE ").push_bind(pattern);
    }
}

#[async_trait::async_trait]
impl PropertyRepository for PropertyRepositoryPg {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<PropertyEntity>, error::SystemError> {
        let property =
            sqlx::query_as::<_, PropertyEntity>("SELECT * FROM properties WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(property)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PropertyEntity>, error::SystemError> {
        let property =
            sqlx::query_as::<_, PropertyEntity>("SELECT * FROM properties WHERE slug = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;
        Ok(property)
    }

    async fn search(
        &self,
        search: &PropertySearch,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PropertyEntity>, i64), error::SystemError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM properties WHERE TRUE");
        push_filters(&mut qb, search);
        qb.push(" ORDER BY featured DESC, created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let items = qb.build_query_as::<PropertyEntity>().fetch_all(&self.pool).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM properties WHERE TRUE");
        push_filters(&mut count, search);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        Ok((items, total))
    }

    async fn create(&self, property: &NewProperty) -> Result<PropertyEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, PropertyEntity>(
            r#"
            INSERT INTO properties (
                id, title, slug, description, property_type, listing_type, price, currency,
                city, district, address, bedrooms, bathrooms, area_sqm, status, featured,
                owner_id, agent_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&property.title)
        .bind(&property.slug)
        .bind(&property.description)
        .bind(&property.property_type)
        .bind(property.listing_type)
        .bind(property.price)
        .bind(&property.currency)
        .bind(&property.city)
        .bind(&property.district)
        .bind(&property.address)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(property.area_sqm)
        .bind(property.status)
        .bind(property.featured)
        .bind(property.owner_id)
        .bind(property.agent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(entity)
    }

    async fn update(
        &self,
        id: &Uuid,
        changes: &UpdatePropertyModel,
    ) -> Result<PropertyEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, PropertyEntity>(
            r#"
        UPDATE properties
        SET
            title         = COALESCE($2, title),
            description   = COALESCE($3, description),
            property_type = COALESCE($4, property_type),
            listing_type  = COALESCE($5, listing_type),
            price         = COALESCE($6, price),
            currency      = COALESCE($7, currency),
            city          = COALESCE($8, city),
            district      = CASE WHEN $9::boolean THEN $10 ELSE district END,
            address       = CASE WHEN $11::boolean THEN $12 ELSE address END,
            bedrooms      = COALESCE($13, bedrooms),
            bathrooms     = COALESCE($14, bathrooms),
            area_sqm      = CASE WHEN $15::boolean THEN $16 ELSE area_sqm END,
            featured      = COALESCE($17, featured),
            agent_id      = CASE WHEN $18::boolean THEN $19 ELSE agent_id END,
            updated_at    = NOW()
        WHERE id = $1
        RETURNING *
        "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.property_type)
        .bind(changes.listing_type)
        .bind(changes.price)
        .bind(&changes.currency)
        .bind(&changes.city)
        .bind(changes.district.is_some())
        .bind(changes.district.as_ref().and_then(|v| v.as_ref()))
        .bind(changes.address.is_some())
        .bind(changes.address.as_ref().and_then(|v| v.as_ref()))
        .bind(changes.bedrooms)
        .bind(changes.bathrooms)
        .bind(changes.area_sqm.is_some())
        .bind(changes.area_sqm.flatten())
        .bind(changes.featured)
        .bind(changes.agent_id.is_some())
        .bind(changes.agent_id.flatten())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Property not found"))?;

        Ok(entity)
    }

    async fn set_status(
        &self,
        id: &Uuid,
        status: PropertyStatus,
    ) -> Result<PropertyEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, PropertyEntity>(
            "UPDATE properties SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Property not found"))?;
        Ok(entity)
    }

    async fn set_images(
        &self,
        id: &Uuid,
        images: &[String],
        photos: &[Photo],
    ) -> Result<PropertyEntity, error::SystemError> {
        let entity = sqlx::query_as::<_, PropertyEntity>(
            r#"
            UPDATE properties
            SET images = $2, photos = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(images)
        .bind(Json(photos))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| error::SystemError::not_found("Property not found"))?;
        Ok(entity)
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, error::SystemError> {
        let rows = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    async fn list_image_rows(&self) -> Result<Vec<PropertyImagesRow>, error::SystemError> {
        let rows = sqlx::query_as::<_, PropertyImagesRow>(
            "SELECT id, title, images, photos FROM properties ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
