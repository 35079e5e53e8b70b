//! Login identity resolution.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Subject;

/// Resolves a login identifier into the [`Subject`] to issue a session for.
///
/// External identity stores plug in here. The resolved subject, including
/// any attributes, is what verification will later return from the cache.
#[async_trait]
pub trait SubjectResolver: Send + Sync {
    /// Resolves the subject for a non-empty mobile identifier.
    async fn resolve(&self, mobile: &str) -> AuthResult<Subject>;
}

/// Uses the mobile identifier itself as the subject id.
#[derive(Debug, Clone, Copy, Default)]
pub struct MobileSubjectResolver;

#[async_trait]
impl SubjectResolver for MobileSubjectResolver {
    async fn resolve(&self, mobile: &str) -> AuthResult<Subject> {
        Ok(Subject::new(mobile).with_attribute("mobile", mobile))
    }
}
