//! Debug and release build profiles.

use std::fmt::{self, Display, Formatter};

/// Named set of optimisation and warning flags.
///
/// Exactly one profile is active per invocation. `build` and `run` use
/// [`BuildProfile::Debug`]; `release` uses [`BuildProfile::Release`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildProfile {
    /// Unoptimised, with debug info.
    #[default]
    Debug,
    /// Optimised, sanitizer disabled.
    Release,
}

impl BuildProfile {
    /// Profile name as shown by `info`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    /// Ordered compiler flags for this profile.
    #[must_use]
    pub const fn compile_flags(self) -> &'static [&'static str] {
        match self {
            Self::Debug => &["-Wall", "-Wextra", "-g", "-O0"],
            Self::Release => &["-Wall", "-Wextra", "-O2"],
        }
    }

    /// Preprocessor defines for this profile.
    #[must_use]
    pub const fn defines(self) -> &'static [&'static str] {
        match self {
            Self::Debug => &["DEBUG"],
            Self::Release => &["NDEBUG"],
        }
    }

    /// Whether AddressSanitizer may be enabled under this profile.
    #[must_use]
    pub const fn allows_sanitizer(self) -> bool {
        matches!(self, Self::Debug)
    }
}

impl Display for BuildProfile {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
