use async_trait::async_trait;

use super::{NewUser, User};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn exists_by_email(&self, email: &str) -> DomainResult<bool>;
    /// Fails with `DuplicateEmail` when the email is already registered.
    async fn insert(&self, user: NewUser) -> DomainResult<User>;
}
