//! Fake compiler drivers.
//!
//! Each driver is a small shell script that appends its argument list to a
//! shared log, creates an empty object for `-c` invocations and writes a
//! runnable stand-in program for link invocations. The stand-in prints its
//! arguments, working directory and `ASAN_OPTIONS`, then exits with
//! `$FAKE_PROGRAM_EXIT` (default 0).

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SCRIPT: &str = r#"#!/bin/sh
printf '%s %s\n' "$(basename "$0")" "$*" >> "@LOG@"
out=""
compile=0
prev=""
for arg in "$@"; do
  if [ "$arg" = "-c" ]; then compile=1; fi
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  if [ -n "@FAIL@" ]; then
    case "$arg" in
      *"@FAIL@"*) echo "$arg: error: injected failure" >&2; exit 1 ;;
    esac
  fi
  prev="$arg"
done
if [ -z "$out" ]; then exit 0; fi
if [ "$compile" = 1 ]; then
  : > "$out"
  exit 0
fi
cat > "$out" <<'PROGRAM'
#!/bin/sh
echo "args: $*"
echo "cwd: $(pwd)"
echo "asan: ${ASAN_OPTIONS:-unset}"
exit "${FAKE_PROGRAM_EXIT:-0}"
PROGRAM
chmod +x "$out"
"#;

/// A pair of fake C and C++ drivers sharing one invocation log.
#[derive(Debug)]
pub struct FakeToolchain {
    _dir: TempDir,
    /// Path of the fake C driver.
    pub cc: PathBuf,
    /// Path of the fake C++ driver.
    pub cxx: PathBuf,
    log: PathBuf,
}

impl FakeToolchain {
    /// Drivers that always succeed.
    pub fn new() -> Self {
        Self::with_failure("")
    }

    /// Drivers that fail whenever an argument contains `pattern`.
    pub fn failing_on(pattern: &str) -> Self {
        Self::with_failure(pattern)
    }

    fn with_failure(pattern: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let log = dir.path().join("invocations.log");
        fs::write(&log, "").expect("create log");
        let script = SCRIPT
            .replace("@LOG@", &log.to_string_lossy())
            .replace("@FAIL@", pattern);
        let cc = write_executable(dir.path(), "fake-cc", &script);
        let cxx = write_executable(dir.path(), "fake-cxx", &script);
        Self {
            _dir: dir,
            cc,
            cxx,
            log,
        }
    }

    /// Every recorded invocation as `driver args...`, oldest first.
    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(&self.log)
            .expect("read log")
            .lines()
            .map(str::to_owned)
            .collect()
    }

    /// Sources passed to `-c`, oldest first.
    pub fn compiled_sources(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .filter_map(|line| {
                let mut words = line.split_whitespace();
                words.find(|word| *word == "-c")?;
                words.next().map(str::to_owned)
            })
            .collect()
    }

    /// Link invocations, oldest first.
    pub fn links(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .filter(|line| !line.split_whitespace().any(|word| word == "-c"))
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        fs::write(&self.log, "").expect("truncate log");
    }
}

impl Default for FakeToolchain {
    fn default() -> Self {
        Self::new()
    }
}

fn write_executable(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write script");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&path).expect("meta").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("perms");
    }
    path
}
