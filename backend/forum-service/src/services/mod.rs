pub mod content;
pub mod filter;
pub mod pagination;

pub use content::ContentService;
pub use filter::build_like_pattern;
pub use pagination::Page;
