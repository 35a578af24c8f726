//! declara-validate
//!
//! Rule evaluation for the health-declaration form: conditional field
//! visibility, required/contraindication/consent validation, and the
//! callback-driven form session.

pub mod session;
pub mod validator;
pub mod visibility;

pub use session::{FormSession, SubmitOutcome};
pub use validator::FormValidator;
pub use visibility::is_visible;
