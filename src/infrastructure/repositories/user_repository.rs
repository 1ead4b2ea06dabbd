//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

use crate::domain::{DomainError, User, UserRepository};
use crate::models::user::{ActiveModel, Column, Entity as UserEntity};

/// SeaORM-based implementation of UserRepository
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn get_by_id(&self, id: &str) -> Result<Option<User>, DomainError> {
        Ok(UserEntity::find_by_id(id).one(&self.db).await?.map(User::from))
    }

    async fn get_by_external_id(&self, external_id: &str) -> Result<Option<User>, DomainError> {
        Ok(UserEntity::find()
            .filter(Column::ExternalId.eq(external_id))
            .one(&self.db)
            .await?
            .map(User::from))
    }

    async fn upsert_from_identity(
        &self,
        external_id: &str,
        email: &str,
        name: &str,
    ) -> Result<User, DomainError> {
        let external_id = external_id.trim();
        if external_id.is_empty() {
            return Err(DomainError::validation("External identity must not be empty"));
        }

        if let Some(existing) = self.get_by_external_id(external_id).await? {
            return Ok(existing);
        }

        let email = email.trim();
        let user = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            external_id: Set(external_id.to_string()),
            name: Set(if name.trim().is_empty() {
                email.to_string()
            } else {
                name.trim().to_string()
            }),
            email: Set(email.to_string()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        // Two first requests for the same identity may race here; the loser
        // inserts nothing and reads back the winner's row.
        let inserted = UserEntity::insert(user)
            .on_conflict(
                OnConflict::column(Column::ExternalId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        let user = self.get_by_external_id(external_id).await?.ok_or_else(|| {
            DomainError::Internal(format!("User {} vanished after upsert", external_id))
        })?;
        if inserted > 0 {
            info!(user_id = %user.id, external_id, "Registered user from identity");
        }
        Ok(user)
    }
}
