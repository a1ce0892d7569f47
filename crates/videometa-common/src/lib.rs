//! Videometa-Common: Shared types, IDs, and errors.
//!
//! - **Typed IDs**: [`ItemId`] wraps the host's integer item identifier
//! - **Core Types**: [`ItemType`] and [`ItemStatus`] discriminators
//! - **Error Handling**: Common error type and result alias
//!
//! # Examples
//!
//! ```
//! use videometa_common::{Error, ItemId, ItemType, Result};
//!
//! let id = ItemId::new(10);
//! assert_eq!(id.get(), 10);
//! assert!(ItemType::Video.is_video());
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("item 10"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
