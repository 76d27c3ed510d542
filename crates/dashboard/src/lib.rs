//! LMS dashboard layout service
//!
//! Resolves which organization a dashboard request belongs to (org
//! subdomain, custom domain or local override), checks selfhosted
//! membership, and produces the layout data and SEO tags for the page.

pub mod config;
pub mod directory;
pub mod error;
pub mod layout;
pub mod routes;
pub mod routing;
pub mod state;

pub use config::Config;
pub use directory::{CachedDirectory, DirectoryError, OrgDirectory, SupabaseDirectory};
pub use error::{ApiError, ApiResult};
pub use layout::{LayoutData, LayoutLoader, LoadRedirect, LoadRequest};
pub use routing::{HostClass, HostResolver, OrgCache};
pub use state::AppState;
