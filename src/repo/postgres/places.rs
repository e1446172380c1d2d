//! `places` table. Grounded in `original_source/internal/repository/postgres/place.go`.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::domain::place::Place;
use crate::error::RepoError;
use crate::repo::PlaceRepo;

#[derive(FromRow)]
struct PlaceRow {
    id: i64,
    description: String,
    route: Option<String>,
    photo_key: Option<String>,
    quality: i32,
}

impl From<PlaceRow> for Place {
    fn from(row: PlaceRow) -> Self {
        Place {
            id: row.id,
            description: row.description,
            route: row.route,
            photo_key: row.photo_key,
            quality: row.quality,
        }
    }
}

pub struct PgPlaceRepo {
    pool: PgPool,
}

impl PgPlaceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaceRepo for PgPlaceRepo {
    async fn list_all(&self) -> Result<Vec<Place>, RepoError> {
        let rows: Vec<PlaceRow> = sqlx::query_as("SELECT id, description, route, photo_key, quality FROM places ORDER BY quality DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Place::from).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Place>, RepoError> {
        let row: Option<PlaceRow> = sqlx::query_as("SELECT id, description, route, photo_key, quality FROM places WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Place::from))
    }
}
