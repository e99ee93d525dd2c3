//! Error classification shared across quill crates.
//!
//! Each crate defines its own `snafu` error enum and implements [`ErrorExt`]
//! to map every variant onto a [`StatusCode`].

mod ext;
mod status_code;

pub use ext::ErrorExt;
pub use snafu::Location;
pub use status_code::StatusCategory;
pub use status_code::StatusCode;
pub use status_code::StatusMeta;
