use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::User;

/// Repository port for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    async fn create(&self, user: &User) -> DomainResult<()>;

    /// Get a user by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<User>>;

    /// Get a user by unique email.
    async fn get_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    /// Resolve a bearer token to its user.
    async fn get_by_token(&self, token: &str) -> DomainResult<Option<User>>;

    /// Replace the user's API token.
    async fn set_token(&self, id: Uuid, token: &str) -> DomainResult<()>;

    /// List all users.
    async fn list(&self) -> DomainResult<Vec<User>>;
}
