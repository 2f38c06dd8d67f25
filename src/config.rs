//! Resolved, immutable build configuration.
//!
//! [`BuildConfig`] is constructed once per invocation from the merged
//! [`Cli`] layers and passed by reference to every later stage. Nothing
//! downstream consults the environment or the command line again.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use crate::cli::{Cli, MAX_JOBS};
use crate::features::{FeatureFlags, FeatureSet};
use crate::platform::{self, Platform};
use crate::profile::BuildProfile;
use crate::toolchain::{Language, LinkItem, Toolchain};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexSet;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Binary name used when the project directory has no usable name.
const FALLBACK_BINARY_NAME: &str = "app";

/// Errors raised while resolving configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The working directory could not be determined.
    #[error("failed to determine the current directory")]
    #[diagnostic(code(rivet::config::current_dir))]
    CurrentDir(#[source] std::io::Error),

    /// The project directory is not valid UTF-8.
    #[error("project directory {} is not valid UTF-8", path.display())]
    #[diagnostic(code(rivet::config::non_utf8_root))]
    NonUtf8Root {
        /// Offending directory.
        path: PathBuf,
    },

    /// A configured job count is out of range.
    #[error("jobs must be between 1 and 64, got {jobs}")]
    #[diagnostic(code(rivet::config::jobs_out_of_range))]
    JobsOutOfRange {
        /// Configured value.
        jobs: usize,
    },

    /// Extra flags could not be split into words.
    #[error("cannot split {field} value `{value}` into arguments")]
    #[diagnostic(
        code(rivet::config::unbalanced_flags),
        help("check for an unterminated quote")
    )]
    UnbalancedFlags {
        /// Configuration key holding the flags.
        field: &'static str,
        /// Raw configured value.
        value: String,
    },
}

/// Conventional directory layout of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Project root.
    pub root: Utf8PathBuf,
    /// Source directory walked for compilation units.
    pub src_dir: Utf8PathBuf,
    /// Header directory used as the coarse invalidation signal.
    pub include_dir: Utf8PathBuf,
    /// Assets copied beside the binary.
    pub resources_dir: Utf8PathBuf,
    /// Generated object files.
    pub obj_dir: Utf8PathBuf,
    /// Generated binary and copied resources.
    pub bin_dir: Utf8PathBuf,
}

impl ProjectLayout {
    /// Lay out `src/`, `include/`, `resources/`, `obj/` and `bin/` under
    /// `root`.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        let root = dir.into();
        Self {
            src_dir: root.join("src"),
            include_dir: root.join("include"),
            resources_dir: root.join("resources"),
            obj_dir: root.join("obj"),
            bin_dir: root.join("bin"),
            root,
        }
    }

    /// Object path for `source`: the source root is swapped for the object
    /// root and the extension for `.o`.
    ///
    /// Returns `None` when `source` does not live under the source directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use rivet::config::ProjectLayout;
    ///
    /// let layout = ProjectLayout::new("proj");
    /// let object = layout.object_for(Utf8Path::new("proj/src/net/socket.cpp"));
    /// assert_eq!(object.as_deref(), Some(Utf8Path::new("proj/obj/net/socket.o")));
    /// ```
    #[must_use]
    pub fn object_for(&self, source: &Utf8Path) -> Option<Utf8PathBuf> {
        let relative = source.strip_prefix(&self.src_dir).ok()?;
        Some(self.obj_dir.join(relative).with_extension("o"))
    }

    /// Where the resources tree is copied to.
    #[must_use]
    pub fn resources_target(&self) -> Utf8PathBuf {
        self.bin_dir.join("resources")
    }

    /// Every directory the build generates.
    #[must_use]
    pub fn generated_dirs(&self) -> [&Utf8Path; 2] {
        [&self.obj_dir, &self.bin_dir]
    }
}

/// Everything a build needs, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    /// Project directories.
    pub layout: ProjectLayout,
    /// File name of the produced binary.
    pub name: String,
    /// Detected or overridden platform.
    pub platform: Platform,
    /// Compiler drivers after overrides.
    pub toolchain: Toolchain,
    /// Active profile.
    pub profile: BuildProfile,
    /// Requested feature toggles.
    pub features: FeatureSet,
    /// Flags contributed by the enabled features.
    pub flags: FeatureFlags,
    /// Extra compile flags from configuration.
    pub extra_cflags: Vec<String>,
    /// Extra link flags from configuration.
    pub extra_ldflags: Vec<String>,
    /// Parallel compile jobs; `None` uses every core.
    pub jobs: Option<usize>,
}

impl BuildConfig {
    /// Configuration for `layout` on `host` with the debug profile, default
    /// toolchain and no extras.
    #[must_use]
    pub fn new(layout: ProjectLayout, host: &str, features: FeatureSet) -> Self {
        let platform = Platform::detect(host);
        let name = default_binary_name(&layout.root);
        Self {
            toolchain: platform.toolchain.clone(),
            flags: features.resolve(&platform.host),
            layout,
            name,
            platform,
            profile: BuildProfile::Debug,
            features,
            extra_cflags: Vec::new(),
            extra_ldflags: Vec::new(),
            jobs: None,
        }
    }

    /// Resolve the configuration requested by `cli`.
    ///
    /// The project root is made absolute so that later stages may change
    /// directory freely.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the project root cannot be determined or
    /// the extra flags cannot be split.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let dir = match &cli.directory {
            Some(path) => std::path::absolute(path).map_err(ConfigError::CurrentDir)?,
            None => std::env::current_dir().map_err(ConfigError::CurrentDir)?,
        };
        let root =
            Utf8PathBuf::from_path_buf(dir).map_err(|path| ConfigError::NonUtf8Root { path })?;
        let host = cli
            .host_os
            .clone()
            .unwrap_or_else(platform::host_identifier);
        let features = FeatureSet {
            raylib: cli.raylib,
            sqlite: cli.sqlite,
            asan: cli.asan,
        };
        let mut config = Self::new(ProjectLayout::new(root), &host, features);
        config.toolchain = config
            .toolchain
            .with_overrides(cli.cc.as_deref(), cli.cxx.as_deref());
        if let Some(name) = cli.name.as_ref().filter(|name| !name.is_empty()) {
            config.name.clone_from(name);
        }
        config.extra_cflags = split_flags("cflags", cli.cflags.as_deref())?;
        config.extra_ldflags = split_flags("ldflags", cli.ldflags.as_deref())?;
        if let Some(jobs) = cli.jobs.filter(|count| !(1..=MAX_JOBS).contains(count)) {
            return Err(ConfigError::JobsOutOfRange { jobs });
        }
        config.jobs = cli.jobs;
        Ok(config)
    }

    /// Switch profile, dropping the sanitizer where the profile forbids it.
    #[must_use]
    pub fn with_profile(mut self, profile: BuildProfile) -> Self {
        if !profile.allows_sanitizer() {
            self.features = self.features.without_sanitizer();
            self.flags = self.features.resolve(&self.platform.host);
        }
        self.profile = profile;
        self
    }

    /// Path of the produced binary.
    #[must_use]
    pub fn binary_path(&self) -> Utf8PathBuf {
        self.layout.bin_dir.join(&self.name)
    }

    /// Profile defines followed by feature defines.
    #[must_use]
    pub fn defines(&self) -> IndexSet<String> {
        self.profile
            .defines()
            .iter()
            .map(|define| (*define).to_owned())
            .chain(self.flags.defines.iter().cloned())
            .collect()
    }

    /// Header search directories: the project's own first.
    #[must_use]
    pub fn include_dirs(&self) -> IndexSet<Utf8PathBuf> {
        std::iter::once(self.layout.include_dir.clone())
            .chain(self.platform.include_dirs.iter().cloned())
            .collect()
    }

    /// Every flag for compiling `language`, excluding inputs and outputs.
    #[must_use]
    pub fn compile_flags(&self, language: Language) -> Vec<String> {
        let mut flags = vec![language.standard_flag().to_owned()];
        flags.extend(
            self.profile
                .compile_flags()
                .iter()
                .map(|flag| (*flag).to_owned()),
        );
        flags.extend(self.flags.compile_flags.iter().cloned());
        flags.extend(self.defines().into_iter().map(|define| format!("-D{define}")));
        flags.extend(
            self.include_dirs()
                .into_iter()
                .map(|dir| format!("-I{dir}")),
        );
        flags.extend(self.extra_cflags.iter().cloned());
        flags
    }

    /// Platform link items followed by feature link items, each once.
    #[must_use]
    pub fn link_items(&self) -> IndexSet<LinkItem> {
        self.platform
            .link_items
            .iter()
            .chain(&self.flags.link_items)
            .cloned()
            .collect()
    }

    /// Every link flag, excluding objects and the output.
    #[must_use]
    pub fn link_flags(&self) -> Vec<String> {
        let mut flags: Vec<String> = self
            .platform
            .lib_dirs
            .iter()
            .map(|dir| format!("-L{dir}"))
            .collect();
        flags.extend(self.flags.link_flags.iter().cloned());
        flags.extend(self.link_items().iter().flat_map(LinkItem::to_args));
        flags.extend(self.extra_ldflags.iter().cloned());
        flags
    }
}

fn default_binary_name(root: &Utf8Path) -> String {
    let named = root
        .file_name()
        .map(str::to_owned)
        .or_else(|| {
            root.canonicalize_utf8()
                .ok()
                .and_then(|path| path.file_name().map(str::to_owned))
        });
    named.unwrap_or_else(|| FALLBACK_BINARY_NAME.to_owned())
}

fn split_flags(field: &'static str, value: Option<&str>) -> Result<Vec<String>, ConfigError> {
    let Some(raw) = value else {
        return Ok(Vec::new());
    };
    shlex::split(raw).ok_or_else(|| ConfigError::UnbalancedFlags {
        field,
        value: raw.to_owned(),
    })
}
