//! company-scout — company listing model, cookie loading, page extraction, and record storage.

pub mod cookies;
pub mod extract;
pub mod store;
pub mod types;

pub use cookies::{describe_load_error, load_cookies, parse_cookies, try_load_cookies};
pub use extract::{DirectoryExtractor, NetworkExtractor, PageExtractor};
pub use store::{CompanyStore, SqliteCompanyStore};
pub use types::*;
