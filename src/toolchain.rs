//! Compiler selection and source language classification.
//!
//! A [`Toolchain`] names the C and C++ compiler drivers used for a single
//! invocation. The same drivers double as link drivers: the binary is linked
//! with whichever compiler matches the program's entry point.
//!
//! # Examples
//!
//! ```
//! use rivet::toolchain::{Language, Toolchain};
//!
//! let toolchain = Toolchain::new("gcc", "g++").with_overrides(Some("clang"), None);
//! assert_eq!(toolchain.compiler_for(Language::C), "clang");
//! assert_eq!(toolchain.compiler_for(Language::Cxx), "g++");
//! ```

use std::fmt::{self, Display, Formatter};

/// Source language of a compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// ISO C, compiled with the C driver.
    C,
    /// ISO C++, compiled with the C++ driver.
    Cxx,
}

impl Language {
    /// Classify a file extension, returning `None` for anything that is not a
    /// compilable source.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "c" => Some(Self::C),
            "cpp" | "cc" | "cxx" => Some(Self::Cxx),
            _ => None,
        }
    }

    /// Language standard flag passed to every compile of this language.
    #[must_use]
    pub const fn standard_flag(self) -> &'static str {
        match self {
            Self::C => "-std=c11",
            Self::Cxx => "-std=c++17",
        }
    }

    /// Human-readable language name.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::Cxx => "C++",
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Compiler drivers selected for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// C compiler driver.
    pub cc: String,
    /// C++ compiler driver.
    pub cxx: String,
}

impl Toolchain {
    /// Construct a toolchain from explicit driver names.
    #[must_use]
    pub fn new(cc: impl Into<String>, cxx: impl Into<String>) -> Self {
        Self {
            cc: cc.into(),
            cxx: cxx.into(),
        }
    }

    /// Replace either driver with a user-supplied override.
    #[must_use]
    pub fn with_overrides(self, cc: Option<&str>, cxx: Option<&str>) -> Self {
        Self {
            cc: cc.map_or(self.cc, str::to_owned),
            cxx: cxx.map_or(self.cxx, str::to_owned),
        }
    }

    /// Driver used to compile (and, for the entry point, link) `language`.
    #[must_use]
    pub fn compiler_for(&self, language: Language) -> &str {
        match language {
            Language::C => &self.cc,
            Language::Cxx => &self.cxx,
        }
    }
}

/// A single unit of linker input.
///
/// Keeping frameworks as one item stops `-framework Cocoa` from being split
/// when duplicate link inputs are removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkItem {
    /// A library linked with `-l<name>`.
    Library(String),
    /// A macOS framework linked with `-framework <name>`.
    Framework(String),
}

impl LinkItem {
    /// Shorthand for [`LinkItem::Library`].
    #[must_use]
    pub fn library(name: &str) -> Self {
        Self::Library(name.to_owned())
    }

    /// Shorthand for [`LinkItem::Framework`].
    #[must_use]
    pub fn framework(name: &str) -> Self {
        Self::Framework(name.to_owned())
    }

    /// Command-line arguments for this item.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        match self {
            Self::Library(name) => vec![format!("-l{name}")],
            Self::Framework(name) => vec!["-framework".to_owned(), name.clone()],
        }
    }
}

impl Display for LinkItem {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Library(name) => write!(f, "-l{name}"),
            Self::Framework(name) => write!(f, "-framework {name}"),
        }
    }
}
