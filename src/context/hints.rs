use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Context versions the bootstrap accepts.
pub const SUPPORTED_VERSIONS: &[(u8, u8)] = &[
    (2, 0),
    (2, 1),
    (3, 0),
    (3, 1),
    (3, 2),
    (3, 3),
    (4, 0),
    (4, 1),
    (4, 2),
    (4, 3),
    (4, 4),
    (4, 5),
    (4, 6),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlVersion {
    pub major: u8,
    pub minor: u8,
}

impl GlVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_VERSIONS.contains(&(self.major, self.minor))
    }
}

impl Default for GlVersion {
    fn default() -> Self {
        Self::new(3, 3)
    }
}

impl fmt::Display for GlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for GlVersion {
    type Err = String;

    /// Parses `MAJOR.MINOR`, e.g. `3.3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .trim()
            .split_once('.')
            .ok_or_else(|| format!("expected MAJOR.MINOR, got '{s}'"))?;
        let major = major.parse().map_err(|_| format!("invalid major version in '{s}'"))?;
        let minor = minor.parse().map_err(|_| format!("invalid minor version in '{s}'"))?;
        Ok(Self::new(major, minor))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Core,
    Compatibility,
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => write!(f, "core"),
            Self::Compatibility => write!(f, "compatibility"),
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "core" => Ok(Self::Core),
            "compat" | "compatibility" => Ok(Self::Compatibility),
            other => Err(format!("unknown profile '{other}', expected core or compatibility")),
        }
    }
}

/// What the caller asks for: a context version and a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContextRequest {
    pub version: GlVersion,
    pub profile: Profile,
}

impl ContextRequest {
    pub const fn new(major: u8, minor: u8, profile: Profile) -> Self {
        Self {
            version: GlVersion::new(major, minor),
            profile,
        }
    }
}

/// Whether the target platform needs a forward-compatible context.
///
/// macOS only hands out core profiles above 2.1 when forward compatibility
/// is requested.
pub const FORWARD_COMPATIBLE: bool = cfg!(target_os = "macos");

/// Context-creation hints derived from a [`ContextRequest`] for the
/// platform this binary was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextHints {
    pub version: GlVersion,
    pub profile: Profile,
    pub forward_compatible: bool,
}

impl ContextHints {
    pub fn from_request(request: ContextRequest) -> Self {
        Self::for_platform(request, FORWARD_COMPATIBLE)
    }

    fn for_platform(request: ContextRequest, forward_compatible: bool) -> Self {
        let profile = if forward_compatible {
            Profile::Core
        } else {
            request.profile
        };

        Self {
            version: request.version,
            profile,
            forward_compatible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        assert_eq!("3.3".parse::<GlVersion>(), Ok(GlVersion::new(3, 3)));
        assert_eq!(" 4.6 ".parse::<GlVersion>(), Ok(GlVersion::new(4, 6)));
        assert!("3".parse::<GlVersion>().is_err());
        assert!("three.3".parse::<GlVersion>().is_err());
    }

    #[test]
    fn test_supported_versions() {
        assert!(GlVersion::new(3, 3).is_supported());
        assert!(GlVersion::new(2, 1).is_supported());
        assert!(!GlVersion::new(3, 4).is_supported());
        assert!(!GlVersion::new(5, 0).is_supported());
        assert!(!GlVersion::new(1, 5).is_supported());
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!("core".parse::<Profile>(), Ok(Profile::Core));
        assert_eq!("Compatibility".parse::<Profile>(), Ok(Profile::Compatibility));
        assert!("es".parse::<Profile>().is_err());
    }

    #[test]
    fn test_forward_compatible_forces_core() {
        let request = ContextRequest::new(3, 3, Profile::Compatibility);

        let hints = ContextHints::for_platform(request, true);
        assert!(hints.forward_compatible);
        assert_eq!(hints.profile, Profile::Core);

        let hints = ContextHints::for_platform(request, false);
        assert!(!hints.forward_compatible);
        assert_eq!(hints.profile, Profile::Compatibility);
        assert_eq!(hints.version, GlVersion::new(3, 3));
    }

    #[test]
    fn test_hints_follow_target_platform() {
        let hints = ContextHints::from_request(ContextRequest::default());
        assert_eq!(hints.forward_compatible, cfg!(target_os = "macos"));
    }
}
