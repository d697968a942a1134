mod contact;
mod ids;
mod progress;
mod unit;

pub use contact::{normalize_spaces, ContactDraft, ContactError, ContactSubmission};
pub use ids::{ParseIdError, UnitId};
pub use progress::ProgressDocument;
pub use unit::{builtin_catalog, Unit, UnitError};
