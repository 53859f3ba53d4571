//! Document model types.
//!
//! This module defines the intermediate representation produced by the
//! line classifier and the image recovery pipeline and consumed by the
//! renderers.

mod asset;
mod document;
mod list;
mod page;
mod table;

pub use asset::{ColorMode, ImageAsset};
pub use document::{Document, Provenance};
pub use list::ListItem;
pub use page::{Block, Page};
pub use table::{Table, TableRow};
