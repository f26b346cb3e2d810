use async_trait::async_trait;
use sqlx::PgPool;

use patio_domain::repository::FamilyDirectory;
use patio_domain::ExchangeError;

use crate::storage_err;

/// Resolves authenticated users to their family unit via the portal's
/// membership table.
pub struct PostgresFamilyDirectory {
    pub pool: PgPool,
}

#[async_trait]
impl FamilyDirectory for PostgresFamilyDirectory {
    async fn family_for_user(&self, user_id: &str) -> Result<Option<String>, ExchangeError> {
        sqlx::query_scalar(
            r#"
            SELECT unidad_familiar_codigo
            FROM usuarios_unidades_familiares
            WHERE usuario_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)
    }
}
