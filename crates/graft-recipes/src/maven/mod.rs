//! Maven recipes and the dependency metadata they consult.

mod metadata;
mod upgrade;
mod version;

pub use metadata::{
    CachedMetadataSource, MetadataSource, StaticMetadataSource, fetch_with_retries,
};
pub use upgrade::{UpgradeDependencyVersion, UpgradeDependencyVersionOptions};
pub use version::{compare_versions, is_release, latest_release};
