//! Data models for the corporate site
//!
//! Media attachments, their polymorphic owners, the content entities that own
//! them, and the typed site settings document.

mod content;
mod media;
mod owner;
mod settings;

pub use content::*;
pub use media::*;
pub use owner::*;
pub use settings::*;
