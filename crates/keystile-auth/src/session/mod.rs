//! Session lifecycle: issuance, verification and refresh.
//!
//! ```text
//! login (mobile) ──► SubjectResolver ──┐
//!                                      ├──► SessionIssuer ──► token pair + cache entry
//! refresh token ───► RefreshRotator ───┘
//!
//! protected request ──► VerificationGate ──► Subject
//! ```

pub mod authorization;
pub mod gate;
pub mod issuer;
pub mod resolver;
pub mod rotator;
pub mod service;

pub use authorization::{Authorization, REFRESH_ROLE};
pub use gate::VerificationGate;
pub use issuer::SessionIssuer;
pub use resolver::{MobileSubjectResolver, SubjectResolver};
pub use rotator::RefreshRotator;
pub use service::SessionService;
