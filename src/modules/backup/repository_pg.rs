use crate::{
    api::error,
    modules::{
        announcement::schema::AnnouncementEntity,
        backup::{
            model::{DatabaseTables, RedactedUser, RestoreSummary},
            repository::BackupRepository,
        },
        project::schema::ProjectEntity,
        property::schema::PropertyEntity,
        testimonial::schema::TestimonialEntity,
        user::schema::UserEntity,
    },
};

#[derive(Clone)]
pub struct BackupRepositoryPg {
    pool: sqlx::PgPool,
}

impl BackupRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl BackupRepository for BackupRepositoryPg {
    async fn dump(&self) -> Result<DatabaseTables, error::SystemError> {
        let properties =
            sqlx::query_as::<_, PropertyEntity>("SELECT * FROM properties ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?;
        let announcements = sqlx::query_as::<_, AnnouncementEntity>(
            "SELECT * FROM announcements ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        let projects =
            sqlx::query_as::<_, ProjectEntity>("SELECT * FROM projects ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?;
        let testimonials =
            sqlx::query_as::<_, TestimonialEntity>("SELECT * FROM testimonials ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?;
        let users = sqlx::query_as::<_, UserEntity>(
            "SELECT * FROM users WHERE deleted_at IS NULL ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(RedactedUser::from)
        .collect();

        Ok(DatabaseTables { properties, announcements, projects, testimonials, users })
    }

    async fn has_properties(&self) -> Result<bool, error::SystemError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM properties)")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn restore(&self, tables: &DatabaseTables) -> Result<RestoreSummary, error::SystemError> {
        let mut tx = self.pool.begin().await?;
        let mut summary = RestoreSummary::default();

        for user in &tables.users {
            summary.users += sqlx::query(
                r#"
                UPDATE users
                SET username = $2, email = $3, role = $4, is_active = $5,
                    display_name = $6, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(user.role)
            .bind(user.is_active)
            .bind(&user.display_name)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        for p in &tables.properties {
            summary.properties += sqlx::query(
                r#"
                INSERT INTO properties (
                    id, title, slug, description, property_type, listing_type, price, currency,
                    city, district, address, bedrooms, bathrooms, area_sqm, images, photos,
                    status, featured, owner_id, agent_id, created_at, updated_at
                )
                VALUES (
                    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                    $17, $18,
                    (SELECT id FROM users WHERE id = $19),
                    (SELECT id FROM users WHERE id = $20),
                    $21, $22
                )
                ON CONFLICT (id) DO UPDATE SET
                    title = EXCLUDED.title,
                    slug = EXCLUDED.slug,
                    description = EXCLUDED.description,
                    property_type = EXCLUDED.property_type,
                    listing_type = EXCLUDED.listing_type,
                    price = EXCLUDED.price,
                    currency = EXCLUDED.currency,
                    city = EXCLUDED.city,
                    district = EXCLUDED.district,
                    address = EXCLUDED.address,
                    bedrooms = EXCLUDED.bedrooms,
                    bathrooms = EXCLUDED.bathrooms,
                    area_sqm = EXCLUDED.area_sqm,
                    images = EXCLUDED.images,
                    photos = EXCLUDED.photos,
                    status = EXCLUDED.status,
                    featured = EXCLUDED.featured,
                    owner_id = EXCLUDED.owner_id,
                    agent_id = EXCLUDED.agent_id,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(p.id)
            .bind(&p.title)
            .bind(&p.slug)
            .bind(&p.description)
            .bind(&p.property_type)
            .bind(p.listing_type)
            .bind(p.price)
            .bind(&p.currency)
            .bind(&p.city)
            .bind(&p.district)
            .bind(&p.address)
            .bind(p.bedrooms)
            .bind(p.bathrooms)
            .bind(p.area_sqm)
            .bind(&p.images)
            .bind(&p.photos)
            .bind(p.status)
            .bind(p.featured)
            .bind(p.owner_id)
            .bind(p.agent_id)
            .bind(p.created_at)
            .bind(p.updated_at)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        for a in &tables.announcements {
            summary.announcements += sqlx::query(
                r#"
                INSERT INTO announcements
                    (id, title, content, is_active, starts_at, ends_at, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO UPDATE SET
                    title = EXCLUDED.title,
                    content = EXCLUDED.content,
                    is_active = EXCLUDED.is_active,
                    starts_at = EXCLUDED.starts_at,
                    ends_at = EXCLUDED.ends_at,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(a.id)
            .bind(&a.title)
            .bind(&a.content)
            .bind(a.is_active)
            .bind(a.starts_at)
            .bind(a.ends_at)
            .bind(a.created_at)
            .bind(a.updated_at)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        for p in &tables.projects {
            summary.projects += sqlx::query(
                r#"
                INSERT INTO projects
                    (id, name, description, location, status, images, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO UPDATE SET
                    name = EXCLUDED.name,
                    description = EXCLUDED.description,
                    location = EXCLUDED.location,
                    status = EXCLUDED.status,
                    images = EXCLUDED.images,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(p.id)
            .bind(&p.name)
            .bind(&p.description)
            .bind(&p.location)
            .bind(p.status)
            .bind(&p.images)
            .bind(p.created_at)
            .bind(p.updated_at)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        for t in &tables.testimonials {
            summary.testimonials += sqlx::query(
                r#"
                INSERT INTO testimonials (id, author_name, content, rating, is_published, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (id) DO UPDATE SET
                    author_name = EXCLUDED.author_name,
                    content = EXCLUDED.content,
                    rating = EXCLUDED.rating,
                    is_published = EXCLUDED.is_published
                "#,
            )
            .bind(t.id)
            .bind(&t.author_name)
            .bind(&t.content)
            .bind(t.rating)
            .bind(t.is_published)
            .bind(t.created_at)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(summary)
    }
}
