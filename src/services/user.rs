use bcrypt::verify;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::info;
use uuid::Uuid;

use crate::auth::{AccessError, JwtService};
use crate::entities::{prelude::*, user};

#[derive(Clone)]
pub struct UserService {
    db: DatabaseConnection,
    jwt_service: JwtService,
}

impl UserService {
    pub fn new(db: DatabaseConnection, jwt_service: JwtService) -> Self {
        Self { db, jwt_service }
    }

    pub fn token_expiration_hours(&self) -> i64 {
        self.jwt_service.expiration_hours()
    }

    /// Check credentials of an active account and issue an access token.
    pub async fn authenticate_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(user::Model, String), AccessError> {
        let user = User::find()
            .filter(user::Column::Email.eq(email))
            .filter(user::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or(AccessError::InvalidCredentials)?;

        if !verify(password, &user.password_hash)? {
            return Err(AccessError::InvalidCredentials);
        }

        let token = self.jwt_service.generate_token(user.id, &user.email)?;
        info!(user_id = %user.id, "user logged in");

        Ok((user, token))
    }

    pub async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<user::Model>, AccessError> {
        let user = User::find_by_id(user_id).one(&self.db).await?;
        Ok(user)
    }
}
