//! The `info` command: a read-only dump of the resolved configuration.

use crate::config::BuildConfig;
use crate::graph::validate_entry_point;
use crate::toolchain::Language;
use itertools::Itertools;
use std::io::{self, Write};

/// Write the resolved configuration of `config` to `out`.
///
/// Nothing is created or compiled. The linker line reflects the entry point
/// currently present in the source directory.
///
/// # Errors
///
/// Returns an [`io::Error`] if writing to `out` fails.
pub fn write_info<W: Write>(config: &BuildConfig, out: &mut W) -> io::Result<()> {
    let toolchain = &config.toolchain;
    let linker = match validate_entry_point(&config.layout.src_dir) {
        Ok(entry) => format!(
            "{} ({})",
            toolchain.compiler_for(entry.language),
            entry.path.file_name().unwrap_or_default()
        ),
        Err(err) => format!("unresolved: {err}"),
    };
    let features = config.features.enabled();
    let jobs = config
        .jobs
        .map_or_else(|| "all cores".to_owned(), |jobs| jobs.to_string());

    writeln!(out, "project:         {}", config.layout.root)?;
    writeln!(out, "binary:          {}", config.binary_path())?;
    writeln!(out, "host:            {}", config.platform.host.identifier())?;
    writeln!(out, "profile:         {}", config.profile)?;
    writeln!(out, "cc:              {}", toolchain.cc)?;
    writeln!(out, "cxx:             {}", toolchain.cxx)?;
    writeln!(out, "linker:          {linker}")?;
    writeln!(out, "features:        {}", or_none(features.iter().join(", ")))?;
    writeln!(
        out,
        "feature defines: {}",
        or_none(config.flags.defines.iter().join(" "))
    )?;
    writeln!(
        out,
        "c flags:         {}",
        config.compile_flags(Language::C).join(" ")
    )?;
    writeln!(
        out,
        "c++ flags:       {}",
        config.compile_flags(Language::Cxx).join(" ")
    )?;
    writeln!(
        out,
        "link flags:      {}",
        or_none(config.link_flags().join(" "))
    )?;
    writeln!(out, "jobs:            {jobs}")?;
    Ok(())
}

fn or_none(text: String) -> String {
    if text.is_empty() {
        "none".to_owned()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectLayout;
    use crate::features::FeatureSet;
    use camino::Utf8PathBuf;
    use std::fs;
    use tempfile::tempdir;

    fn render(config: &BuildConfig) -> String {
        let mut out = Vec::new();
        write_info(config, &mut out).expect("write info");
        String::from_utf8(out).expect("utf8 output")
    }

    #[test]
    fn c_entry_without_features_links_with_the_c_compiler() {
        let dir = tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
        fs::create_dir_all(root.join("src")).expect("create src");
        fs::write(root.join("src/main.c"), "int main(void) { return 0; }\n").expect("write");
        let config = BuildConfig::new(ProjectLayout::new(root), "Linux", FeatureSet::default());

        let text = render(&config);
        assert!(text.contains("linker:          gcc (main.c)"));
        assert!(text.contains("features:        none"));
        assert!(text.contains("feature defines: none"));
        assert!(!dir.path().join("obj").exists());
    }

    #[test]
    fn enabled_features_are_listed() {
        let features = FeatureSet {
            raylib: true,
            sqlite: true,
            ..FeatureSet::default()
        };
        let config = BuildConfig::new(ProjectLayout::new("missing"), "Darwin", features);

        let text = render(&config);
        assert!(text.contains("features:        raylib, sqlite"));
        assert!(text.contains("feature defines: USE_RAYLIB USE_SQLITE"));
        assert!(text.contains("cc:              clang"));
        assert!(text.contains("linker:          unresolved: no program entry point"));
    }
}
