use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgDatabaseError;
use sqlx::PgPool;
use uuid::Uuid;

use patio_domain::repository::OfferRepository;
use patio_domain::{ExchangeError, OfferState, ParkingOffer};

use crate::storage_err;

pub struct PostgresOfferRepository {
    pub pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct OfferRow {
    id: Uuid,
    garaje_codigo: String,
    unidad_familiar_codigo: String,
    fecha_inicio: DateTime<Utc>,
    fecha_fin: DateTime<Utc>,
    estado: String,
    numero_planta: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OfferRow {
    fn into_domain(self) -> Result<ParkingOffer, ExchangeError> {
        let state: OfferState = self
            .estado
            .parse()
            .map_err(ExchangeError::Storage)?;
        Ok(ParkingOffer {
            id: self.id,
            spot_code: self.garaje_codigo,
            owner_family_code: self.unidad_familiar_codigo,
            window_start: self.fecha_inicio,
            window_end: self.fecha_fin,
            state,
            floor: self.numero_planta,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_OFFER: &str = r#"
    SELECT o.id, o.garaje_codigo, o.unidad_familiar_codigo,
           o.fecha_inicio, o.fecha_fin, o.estado,
           g.numero_planta, o.created_at, o.updated_at
    FROM ofertas_parking o
    LEFT JOIN garajes g ON g.codigo = o.garaje_codigo
"#;

/// 23P01 is Postgres's exclusion_violation: the no-overlap constraint on
/// active offers fired because a concurrent insert won.
fn map_insert_err(err: sqlx::Error) -> ExchangeError {
    if let sqlx::Error::Database(ref db) = err {
        if let Some(pg) = db.try_downcast_ref::<PgDatabaseError>() {
            if pg.code() == "23P01" {
                return ExchangeError::Conflict(
                    "an active offer for this spot already overlaps that window".into(),
                );
            }
        }
    }
    storage_err(err)
}

#[async_trait]
impl OfferRepository for PostgresOfferRepository {
    async fn insert(&self, offer: &ParkingOffer) -> Result<(), ExchangeError> {
        sqlx::query(
            r#"
            INSERT INTO ofertas_parking
                (id, garaje_codigo, unidad_familiar_codigo, fecha_inicio, fecha_fin, estado, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(offer.id)
        .bind(&offer.spot_code)
        .bind(&offer.owner_family_code)
        .bind(offer.window_start)
        .bind(offer.window_end)
        .bind(offer.state.as_str())
        .bind(offer.created_at)
        .bind(offer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_err)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ParkingOffer>, ExchangeError> {
        let row = sqlx::query_as::<_, OfferRow>(&format!("{SELECT_OFFER} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.map(OfferRow::into_domain).transpose()
    }

    async fn list_active(&self) -> Result<Vec<ParkingOffer>, ExchangeError> {
        let rows = sqlx::query_as::<_, OfferRow>(&format!(
            "{SELECT_OFFER} WHERE o.estado = 'activa' ORDER BY o.fecha_inicio ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter().map(OfferRow::into_domain).collect()
    }

    async fn has_active_overlap(
        &self,
        spot_code: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, ExchangeError> {
        let hit: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT 1 FROM ofertas_parking
            WHERE garaje_codigo = $1
              AND estado = 'activa'
              AND fecha_inicio < $3
              AND fecha_fin > $2
            LIMIT 1
            "#,
        )
        .bind(spot_code)
        .bind(start)
        .bind(end)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(hit.is_some())
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: OfferState,
        to: OfferState,
    ) -> Result<bool, ExchangeError> {
        // Single conditional write: the state check and the update are one
        // statement, so two racing callers cannot both pass.
        let result = sqlx::query(
            r#"
            UPDATE ofertas_parking
            SET estado = $3, updated_at = now()
            WHERE id = $1 AND estado = $2
            "#,
        )
        .bind(id)
        .bind(expected.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(result.rows_affected() == 1)
    }
}
