//! Layer merging: project values override global ones field by field.

use super::schema::{LibraryConfig, SectionkitConfig, ShopConfig};

/// Merge two layers; any field set in `project` wins.
pub fn merge_configs(global: &SectionkitConfig, project: &SectionkitConfig) -> SectionkitConfig {
    SectionkitConfig {
        library: LibraryConfig {
            roots: project
                .library
                .roots
                .clone()
                .or_else(|| global.library.roots.clone()),
            preview_cache: project
                .library
                .preview_cache
                .clone()
                .or_else(|| global.library.preview_cache.clone()),
        },
        shop: ShopConfig {
            domain: project.shop.domain.clone().or_else(|| global.shop.domain.clone()),
            api_version: project
                .shop
                .api_version
                .clone()
                .or_else(|| global.shop.api_version.clone()),
            access_token_env: project
                .shop
                .access_token_env
                .clone()
                .or_else(|| global.shop.access_token_env.clone()),
            timeout_secs: project.shop.timeout_secs.or(global.shop.timeout_secs),
        },
    }
}
