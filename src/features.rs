//! Optional library integrations.
//!
//! Each toggle in a [`FeatureSet`] contributes defines, compile flags, link
//! flags and link items. Toggles are independent: resolving a set is the
//! union of every enabled feature's contribution, and every entry appears at
//! most once regardless of how many features ask for it.
//!
//! # Examples
//!
//! ```
//! use rivet::features::FeatureSet;
//! use rivet::platform::HostOs;
//!
//! let features = FeatureSet { sqlite: true, ..FeatureSet::default() };
//! let flags = features.resolve(&HostOs::Other("Linux".into()));
//! assert!(flags.defines.contains("USE_SQLITE"));
//! ```

use crate::platform::HostOs;
use crate::toolchain::LinkItem;
use indexmap::IndexSet;
use std::fmt::{self, Display, Formatter};

/// A single optional integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// raylib graphics library.
    Raylib,
    /// SQLite embedded database.
    Sqlite,
    /// AddressSanitizer instrumentation.
    Asan,
}

impl Feature {
    /// Every feature in canonical resolution order.
    pub const ALL: [Self; 3] = [Self::Raylib, Self::Sqlite, Self::Asan];

    /// Configuration key for this feature.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Raylib => "raylib",
            Self::Sqlite => "sqlite",
            Self::Asan => "asan",
        }
    }

    fn contribution(self, host: &HostOs) -> FeatureFlags {
        let mut flags = FeatureFlags::default();
        match self {
            Self::Raylib => {
                flags.defines.insert("USE_RAYLIB".to_owned());
                flags.link_items.insert(LinkItem::library("raylib"));
                if host.is_darwin() {
                    for framework in ["CoreVideo", "IOKit", "Cocoa", "GLUT", "OpenGL"] {
                        flags.link_items.insert(LinkItem::framework(framework));
                    }
                } else {
                    for library in ["GL", "m", "pthread", "dl", "rt", "X11"] {
                        flags.link_items.insert(LinkItem::library(library));
                    }
                }
            }
            Self::Sqlite => {
                flags.defines.insert("USE_SQLITE".to_owned());
                flags.link_items.insert(LinkItem::library("sqlite3"));
            }
            Self::Asan => {
                flags.compile_flags.insert("-fsanitize=address".to_owned());
                flags
                    .compile_flags
                    .insert("-fno-omit-frame-pointer".to_owned());
                flags.link_flags.insert("-fsanitize=address".to_owned());
            }
        }
        flags
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Independent boolean toggles, all off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSet {
    /// Link against raylib.
    pub raylib: bool,
    /// Link against SQLite.
    pub sqlite: bool,
    /// Instrument with AddressSanitizer.
    pub asan: bool,
}

impl FeatureSet {
    /// Whether `feature` is switched on.
    #[must_use]
    pub const fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Raylib => self.raylib,
            Feature::Sqlite => self.sqlite,
            Feature::Asan => self.asan,
        }
    }

    /// Enabled features in canonical order.
    #[must_use]
    pub fn enabled(&self) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|feature| self.is_enabled(*feature))
            .collect()
    }

    /// The same set with the sanitizer switched off.
    #[must_use]
    pub const fn without_sanitizer(self) -> Self {
        Self {
            asan: false,
            ..self
        }
    }

    /// Union of the contributions of every enabled feature.
    #[must_use]
    pub fn resolve(&self, host: &HostOs) -> FeatureFlags {
        self.enabled()
            .into_iter()
            .fold(FeatureFlags::default(), |mut acc, feature| {
                acc.extend(feature.contribution(host));
                acc
            })
    }
}

/// Incremental configuration produced by resolving a [`FeatureSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Preprocessor defines, without the `-D` prefix.
    pub defines: IndexSet<String>,
    /// Flags passed to every compile.
    pub compile_flags: IndexSet<String>,
    /// Flags passed to the link driver ahead of link items.
    pub link_flags: IndexSet<String>,
    /// Libraries and frameworks to link.
    pub link_items: IndexSet<LinkItem>,
}

impl FeatureFlags {
    /// Absorb `other`, keeping the first occurrence of each entry.
    pub fn extend(&mut self, other: Self) {
        self.defines.extend(other.defines);
        self.compile_flags.extend(other.compile_flags);
        self.link_flags.extend(other.link_flags);
        self.link_items.extend(other.link_items);
    }

    /// Whether no feature contributed anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
            && self.compile_flags.is_empty()
            && self.link_flags.is_empty()
            && self.link_items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn linux() -> HostOs {
        HostOs::Other("Linux".into())
    }

    #[rstest]
    fn no_toggles_contribute_nothing(linux: HostOs) {
        assert!(FeatureSet::default().resolve(&linux).is_empty());
        assert!(FeatureSet::default().resolve(&HostOs::Darwin).is_empty());
    }

    #[rstest]
    #[case(FeatureSet { raylib: true, ..FeatureSet::default() })]
    #[case(FeatureSet { sqlite: true, ..FeatureSet::default() })]
    #[case(FeatureSet { asan: true, ..FeatureSet::default() })]
    #[case(FeatureSet { raylib: true, sqlite: true, asan: true })]
    fn two_sets_resolve_to_the_union(linux: HostOs, #[case] other: FeatureSet) {
        let sqlite = FeatureSet {
            sqlite: true,
            ..FeatureSet::default()
        };
        let combined = FeatureSet {
            raylib: sqlite.raylib || other.raylib,
            sqlite: true,
            asan: sqlite.asan || other.asan,
        };
        let mut expected = sqlite.resolve(&linux);
        expected.extend(other.resolve(&linux));
        assert_eq!(combined.resolve(&linux), expected);
    }

    #[rstest]
    fn entries_appear_exactly_once(linux: HostOs) {
        let everything = FeatureSet {
            raylib: true,
            sqlite: true,
            asan: true,
        };
        let mut flags = everything.resolve(&linux);
        flags.extend(everything.resolve(&linux));
        let libm = flags
            .link_items
            .iter()
            .filter(|item| **item == LinkItem::library("m"))
            .count();
        assert_eq!(libm, 1);
        assert_eq!(flags.defines.len(), 2);
        assert_eq!(flags.link_flags.len(), 1);
    }

    #[test]
    fn raylib_links_frameworks_on_darwin() {
        let flags = FeatureSet {
            raylib: true,
            ..FeatureSet::default()
        }
        .resolve(&HostOs::Darwin);
        assert!(flags.link_items.contains(&LinkItem::framework("Cocoa")));
        assert!(!flags.link_items.contains(&LinkItem::library("X11")));
    }

    #[rstest]
    fn raylib_links_x11_elsewhere(linux: HostOs) {
        let flags = FeatureSet {
            raylib: true,
            ..FeatureSet::default()
        }
        .resolve(&linux);
        assert!(flags.link_items.contains(&LinkItem::library("X11")));
        assert!(!flags.link_items.contains(&LinkItem::framework("Cocoa")));
    }

    #[test]
    fn without_sanitizer_keeps_other_toggles() {
        let features = FeatureSet {
            raylib: true,
            sqlite: false,
            asan: true,
        }
        .without_sanitizer();
        assert_eq!(features.enabled(), vec![Feature::Raylib]);
    }
}
