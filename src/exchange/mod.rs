pub mod exchange;
pub mod http;
pub mod memory;

use std::path::PathBuf;

use serde::Serialize;

pub const COMPONENT_NAME: &str = "agGrid";
pub const DEV_SERVER_URL: &str = "http://localhost:3001";

/// Where the host loads the widget from. Chosen once at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ComponentLocation {
    /// A running frontend dev server.
    #[serde(rename = "url")]
    DevServer(String),
    /// The built frontend bundle.
    #[serde(rename = "path")]
    Bundled(PathBuf),
}

impl ComponentLocation {
    /// The `frontend/build` bundle next to this crate's sources. The path is
    /// fixed at compile time, so hosts shipping their own bundle should use
    /// `Bundled(path)` or set `AGGRID_BUILD_DIR`.
    pub fn bundled() -> Self {
        ComponentLocation::Bundled(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("frontend").join("build"))
    }

    pub fn dev_server() -> Self {
        ComponentLocation::DevServer(DEV_SERVER_URL.to_string())
    }

    pub fn from_release_flag(release: bool) -> Self {
        if release {
            Self::bundled()
        } else {
            Self::dev_server()
        }
    }

    /// Reads `AGGRID_RELEASE` and `AGGRID_BUILD_DIR`, see [`Self::from_settings`].
    pub fn from_env() -> Self {
        let release = std::env::var("AGGRID_RELEASE").ok();
        let build_dir = std::env::var("AGGRID_BUILD_DIR").ok();
        let location = Self::from_settings(release.as_deref(), build_dir.as_deref());
        log::debug!("Loading grid component from {:?}", location);
        location
    }

    /// `release == "false"` (any case) selects the dev server, anything else
    /// the bundle. A non-empty `build_dir` replaces the default bundle path.
    pub fn from_settings(release: Option<&str>, build_dir: Option<&str>) -> Self {
        let release = release.map_or(true, |v| !v.trim().eq_ignore_ascii_case("false"));
        match build_dir.map(str::trim) {
            Some(dir) if release && !dir.is_empty() => ComponentLocation::Bundled(PathBuf::from(dir)),
            _ => Self::from_release_flag(release),
        }
    }
}

/// Name and location the host needs to mount the component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentDeclaration {
    pub name: String,
    #[serde(flatten)]
    pub location: ComponentLocation,
}

impl ComponentDeclaration {
    pub fn new(location: ComponentLocation) -> Self {
        Self {
            name: COMPONENT_NAME.to_string(),
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn release_flag_picks_location() {
        assert_eq!(ComponentLocation::from_release_flag(false), ComponentLocation::dev_server());
        assert!(matches!(ComponentLocation::from_release_flag(true), ComponentLocation::Bundled(_)));
    }

    #[test]
    fn settings_pick_location() {
        assert_eq!(ComponentLocation::from_settings(None, None), ComponentLocation::bundled());
        assert_eq!(ComponentLocation::from_settings(Some("FALSE"), None), ComponentLocation::dev_server());
        assert_eq!(ComponentLocation::from_settings(Some("yes"), None), ComponentLocation::bundled());
        assert_eq!(
            ComponentLocation::from_settings(None, Some("/srv/grid/build")),
            ComponentLocation::Bundled(PathBuf::from("/srv/grid/build"))
        );
        assert_eq!(
            ComponentLocation::from_settings(Some("false"), Some("/srv/grid/build")),
            ComponentLocation::dev_server()
        );
        assert_eq!(ComponentLocation::from_settings(None, Some("  ")), ComponentLocation::bundled());
    }

    #[test]
    fn declaration_flattens_location() {
        let declaration = ComponentDeclaration::new(ComponentLocation::dev_server());
        assert_eq!(
            serde_json::to_value(&declaration).unwrap(),
            json!({"name": "agGrid", "url": "http://localhost:3001"})
        );
    }
}
