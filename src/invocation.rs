//! Compiler and linker command lines.
//!
//! An [`Invocation`] is the fully resolved argument vector for one tool run.
//! Keeping it as plain data separates "what would run" from actually
//! spawning it, which the `info` command and the tests rely on.

use crate::config::BuildConfig;
use crate::graph::{BuildGraph, SourceUnit};
use std::fmt::{self, Display, Formatter};
use std::process::Command;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Compiler or linker driver.
    pub program: String,
    /// Arguments in order.
    pub args: Vec<String>,
}

impl Invocation {
    /// Compile `unit` to its object file.
    #[must_use]
    pub fn compile(config: &BuildConfig, unit: &SourceUnit) -> Self {
        let mut args = config.compile_flags(unit.language);
        args.extend([
            "-c".to_owned(),
            unit.source.to_string(),
            "-o".to_owned(),
            unit.object.to_string(),
        ]);
        Self {
            program: config.toolchain.compiler_for(unit.language).to_owned(),
            args,
        }
    }

    /// Link every object in `graph` into the binary.
    ///
    /// The driver matches the entry point's language so that a C++ program
    /// pulls in the C++ runtime.
    #[must_use]
    pub fn link(config: &BuildConfig, graph: &BuildGraph) -> Self {
        let mut args: Vec<String> = graph.objects().map(|object| object.to_string()).collect();
        args.push("-o".to_owned());
        args.push(config.binary_path().into_string());
        args.extend(config.link_flags());
        Self {
            program: config
                .toolchain
                .compiler_for(graph.entry.language)
                .to_owned(),
            args,
        }
    }

    /// A [`Command`] ready to spawn.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl Display for Invocation {
    /// Render as a shell-pasteable line.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(word: &str) -> String {
    shlex::try_quote(word).map_or_else(|_| word.to_owned(), |quoted| quoted.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectLayout;
    use crate::features::FeatureSet;
    use crate::graph::EntryPoint;
    use crate::toolchain::Language;
    use camino::Utf8PathBuf;

    fn unit(source: &str, object: &str, language: Language) -> SourceUnit {
        SourceUnit {
            source: Utf8PathBuf::from(source),
            object: Utf8PathBuf::from(object),
            language,
        }
    }

    fn graph(entry: Language) -> BuildGraph {
        let main = match entry {
            Language::C => "p/src/main.c",
            Language::Cxx => "p/src/main.cpp",
        };
        BuildGraph {
            entry: EntryPoint {
                path: Utf8PathBuf::from(main),
                language: entry,
            },
            units: vec![
                unit(main, "p/obj/main.o", entry),
                unit("p/src/util.c", "p/obj/util.o", Language::C),
            ],
            headers: Vec::new(),
        }
    }

    fn config(features: FeatureSet) -> BuildConfig {
        BuildConfig::new(ProjectLayout::new("p"), "Linux", features)
    }

    #[test]
    fn compile_uses_language_driver_and_ends_with_io() {
        let invocation = Invocation::compile(
            &config(FeatureSet::default()),
            &unit("p/src/a.cc", "p/obj/a.o", Language::Cxx),
        );
        assert_eq!(invocation.program, "g++");
        assert_eq!(invocation.args.first().map(String::as_str), Some("-std=c++17"));
        assert!(invocation.args.ends_with(&[
            "-c".to_owned(),
            "p/src/a.cc".to_owned(),
            "-o".to_owned(),
            "p/obj/a.o".to_owned(),
        ]));
    }

    #[test]
    fn c_entry_links_with_the_c_driver() {
        let invocation = Invocation::link(&config(FeatureSet::default()), &graph(Language::C));
        assert_eq!(invocation.program, "gcc");
        assert_eq!(
            invocation.args,
            vec!["p/obj/main.o", "p/obj/util.o", "-o", "p/bin/p", "-lm"]
        );
    }

    #[test]
    fn cxx_entry_links_with_the_cxx_driver() {
        let invocation = Invocation::link(&config(FeatureSet::default()), &graph(Language::Cxx));
        assert_eq!(invocation.program, "g++");
    }

    #[test]
    fn sanitizer_reaches_compile_and_link() {
        let features = FeatureSet {
            asan: true,
            ..FeatureSet::default()
        };
        let config = config(features);
        let compile =
            Invocation::compile(&config, &unit("p/src/main.c", "p/obj/main.o", Language::C));
        assert!(compile.args.contains(&"-fsanitize=address".to_owned()));
        assert!(compile.args.contains(&"-fno-omit-frame-pointer".to_owned()));
        let link = Invocation::link(&config, &graph(Language::C));
        assert!(link.args.contains(&"-fsanitize=address".to_owned()));
    }

    #[test]
    fn display_is_shell_pasteable() {
        let invocation = Invocation {
            program: "gcc".to_owned(),
            args: vec!["-DNAME=a b".to_owned(), "-c".to_owned()],
        };
        let rendered = invocation.to_string();
        assert!(rendered.starts_with("gcc "));
        assert_eq!(
            shlex::split(&rendered),
            Some(vec!["gcc".to_owned(), "-DNAME=a b".to_owned(), "-c".to_owned()])
        );
    }

    #[test]
    fn to_command_preserves_arguments() {
        let invocation = Invocation {
            program: "cc".to_owned(),
            args: vec!["-c".to_owned(), "x.c".to_owned()],
        };
        let cmd = invocation.to_command();
        assert_eq!(cmd.get_program(), "cc");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, ["-c", "x.c"]);
    }
}
