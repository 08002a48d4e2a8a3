//! Page types and layout.
//!
//! - [`Page`] - The raw 4KB data container
//! - [`PageHeader`] - Metadata at the start of every page
//! - [`PageType`] - Discriminator checked before a page is viewed as a typed node

#[allow(clippy::module_inception)]
mod page;
mod page_header;

pub use page::Page;
pub use page_header::{PageHeader, PageType};
