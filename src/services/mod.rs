pub mod applications;
pub mod identity;
pub mod jobs;
pub mod lifecycle;

pub use identity::{IdentityConfig, IdentityService};
