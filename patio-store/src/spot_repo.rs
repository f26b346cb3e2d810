use async_trait::async_trait;
use sqlx::PgPool;

use patio_domain::repository::SpotRepository;
use patio_domain::{ExchangeError, ParkingSpot};

use crate::storage_err;

pub struct PostgresSpotRepository {
    pub pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct SpotRow {
    codigo: String,
    unidad_familiar_codigo: String,
    numero_planta: i32,
}

#[async_trait]
impl SpotRepository for PostgresSpotRepository {
    async fn get(&self, code: &str) -> Result<Option<ParkingSpot>, ExchangeError> {
        let row = sqlx::query_as::<_, SpotRow>(
            r#"
            SELECT codigo, unidad_familiar_codigo, numero_planta
            FROM garajes
            WHERE codigo = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.map(|r| ParkingSpot {
            code: r.codigo,
            owner_family_code: r.unidad_familiar_codigo,
            floor: r.numero_planta,
        }))
    }
}
