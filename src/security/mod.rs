pub mod guard;
pub mod scrub;

pub use guard::{BUILTIN_DENYLIST, GuardVerdict, REJECTION_MESSAGE, SafetyGuard};
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
