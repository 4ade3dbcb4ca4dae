#[macro_use]
mod macros;

pub mod access;
pub use access::{GroupId, Permission, Principal};

pub mod driver;
pub use driver::Store;

mod error;
pub use error::{Error, IntoError};

pub mod schema;
pub use schema::Schema;

pub mod stmt;

/// A Result type alias that uses Tally's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;
