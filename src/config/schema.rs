//! Configuration schema types for `site.toml`
//!
//! Defines the structure and validation rules for sitepack project configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Platforms the `deploy` section may name as a default target.
const KNOWN_PLATFORMS: [&str; 4] = ["github", "netlify", "vercel", "preview"];

/// Top-level configuration loaded from `site.toml`.
///
/// Every section is optional; a missing file yields the same values as an
/// empty one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Project metadata
    #[serde(default)]
    pub project: ProjectConfig,
    /// Build pipeline settings
    #[serde(default)]
    pub build: BuildConfig,
    /// Deployment settings
    #[serde(default)]
    pub deploy: DeployConfig,
}

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name (defaults to the directory name)
    #[serde(default = "default_name")]
    pub name: String,
    /// Build output directory, relative to the project root
    #[serde(default = "default_out")]
    pub out: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { name: default_name(), out: default_out() }
    }
}

/// Build pipeline section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory names excluded from collection wherever they appear
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    /// Prefix for the deployment archive name (`<prefix>_<timestamp>.zip`)
    #[serde(default = "default_archive_prefix")]
    pub archive_prefix: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self { exclude: default_exclude(), archive_prefix: default_archive_prefix() }
    }
}

/// Deployment section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Default platform when `sitepack deploy` is invoked without one
    #[serde(default)]
    pub platform: Option<String>,
    /// Port for the local preview server
    #[serde(default = "default_preview_port")]
    pub preview_port: u16,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self { platform: None, preview_port: default_preview_port() }
    }
}

fn default_name() -> String {
    "website".to_string()
}

fn default_out() -> PathBuf {
    PathBuf::from("dist")
}

fn default_exclude() -> Vec<String> {
    vec!["node_modules".to_string()]
}

fn default_archive_prefix() -> String {
    "website".to_string()
}

fn default_preview_port() -> u16 {
    8000
}

impl SiteConfig {
    /// Validate the configuration, returning human-readable problems.
    ///
    /// An empty vector means the configuration is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.project.name.trim().is_empty() {
            errors.push("project.name must not be empty".to_string());
        }

        let out = &self.project.out;
        if out.as_os_str().is_empty() {
            errors.push("project.out must not be empty".to_string());
        } else if out.is_absolute() {
            errors.push("project.out must be relative to the project root".to_string());
        } else if out.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
            errors.push("project.out must stay inside the project root".to_string());
        }

        for entry in &self.build.exclude {
            if entry.is_empty() {
                errors.push("build.exclude entries must not be empty".to_string());
            } else if entry.contains('/') || entry.contains('\\') {
                errors.push(format!(
                    "build.exclude entry '{}' must be a directory name, not a path",
                    entry
                ));
            }
        }

        let prefix = &self.build.archive_prefix;
        if prefix.is_empty() {
            errors.push("build.archive_prefix must not be empty".to_string());
        } else if prefix.contains('/') || prefix.contains('\\') {
            errors.push(format!(
                "build.archive_prefix '{}' must not contain path separators",
                prefix
            ));
        }

        if let Some(platform) = &self.deploy.platform {
            if !KNOWN_PLATFORMS.contains(&platform.as_str()) {
                errors.push(format!(
                    "deploy.platform '{}' is unknown (expected one of: {})",
                    platform,
                    KNOWN_PLATFORMS.join(", ")
                ));
            }
        }

        if self.deploy.preview_port == 0 {
            errors.push("deploy.preview_port must be nonzero".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SiteConfig::default();
        assert!(config.validate().is_empty());
        assert_eq!(config.project.out, PathBuf::from("dist"));
        assert_eq!(config.build.exclude, vec!["node_modules".to_string()]);
        assert_eq!(config.build.archive_prefix, "website");
        assert_eq!(config.deploy.preview_port, 8000);
    }

    #[test]
    fn test_parse_empty_toml() {
        let config: SiteConfig = toml::from_str("").unwrap();
        assert_eq!(config.project.out, PathBuf::from("dist"));
        assert!(config.deploy.platform.is_none());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: SiteConfig = toml::from_str(
            r#"
            [project]
            name = "portfolio"

            [build]
            exclude = ["node_modules", "vendor"]

            [deploy]
            platform = "netlify"
            "#,
        )
        .unwrap();

        assert_eq!(config.project.name, "portfolio");
        assert_eq!(config.project.out, PathBuf::from("dist"));
        assert_eq!(config.build.exclude.len(), 2);
        assert_eq!(config.deploy.platform.as_deref(), Some("netlify"));
    }

    #[test]
    fn test_validate_rejects_absolute_out() {
        let mut config = SiteConfig::default();
        config.project.out = PathBuf::from("/tmp/dist");
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("project.out")));
    }

    #[test]
    fn test_validate_rejects_parent_out() {
        let mut config = SiteConfig::default();
        config.project.out = PathBuf::from("../dist");
        assert!(!config.validate().is_empty());
    }

    #[test]
    fn test_validate_rejects_exclude_path() {
        let mut config = SiteConfig::default();
        config.build.exclude = vec!["vendor/cache".to_string()];
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("build.exclude")));
    }

    #[test]
    fn test_validate_rejects_unknown_platform() {
        let mut config = SiteConfig::default();
        config.deploy.platform = Some("heroku".to_string());
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("deploy.platform")));
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut config = SiteConfig::default();
        config.deploy.preview_port = 0;
        assert!(!config.validate().is_empty());
    }
}
