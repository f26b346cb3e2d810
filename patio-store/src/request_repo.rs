use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use patio_domain::repository::RequestRepository;
use patio_domain::{ExchangeError, ParkingRequest, RequestState};

use crate::storage_err;

pub struct PostgresRequestRepository {
    pub pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct RequestRow {
    id: Uuid,
    oferta_id: Option<Uuid>,
    solicitante_unidad_familiar_codigo: String,
    planta_solicitada: i32,
    fecha_inicio: DateTime<Utc>,
    fecha_fin: DateTime<Utc>,
    estado: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RequestRow {
    fn into_domain(self) -> Result<ParkingRequest, ExchangeError> {
        let state: RequestState = self
            .estado
            .parse()
            .map_err(ExchangeError::Storage)?;
        Ok(ParkingRequest {
            id: self.id,
            linked_offer_id: self.oferta_id,
            requester_family_code: self.solicitante_unidad_familiar_codigo,
            requested_floor: self.planta_solicitada,
            window_start: self.fecha_inicio,
            window_end: self.fecha_fin,
            state,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_REQUEST: &str = r#"
    SELECT id, oferta_id, solicitante_unidad_familiar_codigo, planta_solicitada,
           fecha_inicio, fecha_fin, estado, created_at, updated_at
    FROM solicitudes_parking
"#;

#[async_trait]
impl RequestRepository for PostgresRequestRepository {
    async fn insert(&self, request: &ParkingRequest) -> Result<(), ExchangeError> {
        sqlx::query(
            r#"
            INSERT INTO solicitudes_parking
                (id, oferta_id, solicitante_unidad_familiar_codigo, planta_solicitada,
                 fecha_inicio, fecha_fin, estado, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(request.id)
        .bind(request.linked_offer_id)
        .bind(&request.requester_family_code)
        .bind(request.requested_floor)
        .bind(request.window_start)
        .bind(request.window_end)
        .bind(request.state.as_str())
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ParkingRequest>, ExchangeError> {
        let row = sqlx::query_as::<_, RequestRow>(&format!("{SELECT_REQUEST} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.map(RequestRow::into_domain).transpose()
    }

    async fn list_for_family(&self, family_code: &str) -> Result<Vec<ParkingRequest>, ExchangeError> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            r#"{SELECT_REQUEST}
            WHERE solicitante_unidad_familiar_codigo = $1 AND estado <> 'cancelada'
            ORDER BY created_at DESC"#
        ))
        .bind(family_code)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.into_iter().map(RequestRow::into_domain).collect()
    }

    async fn transition(
        &self,
        id: Uuid,
        expected: RequestState,
        to: RequestState,
    ) -> Result<bool, ExchangeError> {
        let result = sqlx::query(
            r#"
            UPDATE solicitudes_parking
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
