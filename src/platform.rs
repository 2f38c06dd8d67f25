//! Host platform detection.
//!
//! Only two branches exist: macOS (`Darwin`, as reported by `uname -s`) and a
//! fallback that covers every other host. Detection cannot fail; an
//! unrecognised identifier silently selects the fallback.

use crate::toolchain::{LinkItem, Toolchain};
use camino::Utf8PathBuf;

/// Identifier `uname -s` reports on macOS.
pub const DARWIN: &str = "Darwin";

/// Host operating system as seen by the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOs {
    /// macOS.
    Darwin,
    /// Any other host, keeping the identifier for display.
    Other(String),
}

impl HostOs {
    /// Classify a host identifier.
    #[must_use]
    pub fn from_identifier(identifier: &str) -> Self {
        if identifier == DARWIN {
            Self::Darwin
        } else {
            Self::Other(identifier.to_owned())
        }
    }

    /// The identifier this host was detected from.
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Darwin => DARWIN,
            Self::Other(identifier) => identifier,
        }
    }

    /// Whether this is the macOS branch.
    #[must_use]
    pub const fn is_darwin(&self) -> bool {
        matches!(self, Self::Darwin)
    }
}

/// Report the running host's identifier in `uname -s` form.
#[must_use]
pub fn host_identifier() -> String {
    if cfg!(target_os = "macos") {
        return DARWIN.to_owned();
    }
    let os = std::env::consts::OS;
    let mut chars = os.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_ascii_uppercase().to_string() + chars.as_str()
    })
}

/// Toolchain and search paths selected for a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Host the configuration targets.
    pub host: HostOs,
    /// Default compiler drivers.
    pub toolchain: Toolchain,
    /// Extra header search directories.
    pub include_dirs: Vec<Utf8PathBuf>,
    /// Extra library search directories.
    pub lib_dirs: Vec<Utf8PathBuf>,
    /// Libraries every binary on this host links against.
    pub link_items: Vec<LinkItem>,
}

impl Platform {
    /// Select the toolchain and search paths for `identifier`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rivet::platform::Platform;
    ///
    /// let platform = Platform::detect("Linux");
    /// assert_eq!(platform.toolchain.cc, "gcc");
    /// let platform = Platform::detect("Darwin");
    /// assert_eq!(platform.toolchain.cc, "clang");
    /// ```
    #[must_use]
    pub fn detect(identifier: &str) -> Self {
        match HostOs::from_identifier(identifier) {
            HostOs::Darwin => Self {
                host: HostOs::Darwin,
                toolchain: Toolchain::new("clang", "clang++"),
                include_dirs: vec![
                    Utf8PathBuf::from("/opt/homebrew/include"),
                    Utf8PathBuf::from("/usr/local/include"),
                ],
                lib_dirs: vec![
                    Utf8PathBuf::from("/opt/homebrew/lib"),
                    Utf8PathBuf::from("/usr/local/lib"),
                ],
                link_items: Vec::new(),
            },
            other => Self {
                host: other,
                toolchain: Toolchain::new("gcc", "g++"),
                include_dirs: Vec::new(),
                lib_dirs: Vec::new(),
                link_items: vec![LinkItem::library("m")],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Linux")]
    #[case("FreeBSD")]
    #[case("darwin")]
    #[case("")]
    fn non_darwin_identifiers_use_the_fallback(#[case] identifier: &str) {
        let platform = Platform::detect(identifier);
        assert_eq!(platform.host, HostOs::Other(identifier.to_owned()));
        assert_eq!(platform.toolchain, Toolchain::new("gcc", "g++"));
        assert!(platform.lib_dirs.is_empty());
        assert_eq!(platform.link_items, vec![LinkItem::library("m")]);
    }

    #[test]
    fn darwin_uses_clang_and_homebrew_paths() {
        let platform = Platform::detect(DARWIN);
        assert!(platform.host.is_darwin());
        assert_eq!(platform.toolchain, Toolchain::new("clang", "clang++"));
        assert!(
            platform
                .include_dirs
                .contains(&Utf8PathBuf::from("/opt/homebrew/include"))
        );
        assert!(platform.link_items.is_empty());
    }

    #[test]
    fn host_identifier_is_capitalised() {
        let identifier = host_identifier();
        assert!(identifier.chars().next().is_some_and(char::is_uppercase));
    }
}
