//! Page Sources
//!
//! This module provides the decoder boundary: turning a decoded document into
//! per-page words and rule segments that feed the rule engine.
//!
//! ## Architecture
//!
//! ```text
//! Document (PDF via external decoder)
//!     ↓
//! [Page dump: JSON]
//!     ↓
//! PageSource (one PageContent per page)
//!     ↓
//! [Rule engine + grid builder]
//!     ↓
//! Line records / grid records
//! ```
//!
//! ## Available Sources
//!
//! - `JsonPageSource` - JSON page dumps written by a decoder
//! - `InMemorySource` - pages built in memory

pub mod json;
pub mod traits;

// Re-export main types
pub use json::{JsonPageSource, JsonSourceLoader};
pub use traits::{InMemorySource, PageSource, SourceLoader};
