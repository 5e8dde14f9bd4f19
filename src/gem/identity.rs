use std::fmt;

/// Platform string RubyGems uses for pure-Ruby gems.
pub const DEFAULT_PLATFORM: &str = "ruby";

/// Unique key of a package variant: (name, version, platform).
///
/// The canonical string form omits the platform when it is [`DEFAULT_PLATFORM`]:
/// `rack-2.2.8` versus `nokogiri-1.16.0-x86_64-linux`. The same form names the
/// `.gem` file on disk, so it doubles as the directory key for redirects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageIdentity {
    pub name: String,
    pub version: String,
    pub platform: String,
}

impl PackageIdentity {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            platform: platform.into(),
        }
    }

    pub fn is_default_platform(&self) -> bool {
        self.platform == DEFAULT_PLATFORM
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default_platform() {
            write!(f, "{}-{}", self.name, self.version)
        } else {
            write!(f, "{}-{}-{}", self.name, self.version, self.platform)
        }
    }
}
