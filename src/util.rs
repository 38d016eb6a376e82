use crate::config::{self, ConfigManager};
use regex::Regex;
use semver::Version;
use std::collections::BTreeMap;
use std::env;
use std::io::Read;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

/// Marker expected in `--version` output of a genuine blender executable.
const BLENDER_MARKER: &str = "Blender";

/// Budget for the cheap "is this blender at all" probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Budget for extracting the full version line.
const VERSION_TIMEOUT: Duration = Duration::from_secs(5);

/// Normalize a path string to the platform separator.
pub fn transform_path_to_standard(path: &str) -> String {
    path.replace(['/', '\\'], &MAIN_SEPARATOR.to_string())
}

/// Base name of a path, tolerating either separator style. Project files may
/// arrive with Windows-style paths regardless of the host platform.
pub fn file_name_from_path(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Existence check; an empty path is treated as absent.
pub fn is_path_exists(path: &str) -> bool {
    !path.is_empty() && Path::new(path).exists()
}

/// Report available logical cores, falling back to 1 when the platform
/// cannot tell.
pub fn cpu_count() -> usize {
    thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1)
}

/// Prepend a directory to the process search path. Repeated calls keep
/// prepending; callers deduplicate if they care.
pub fn prepend_to_path(dir: &str) {
    let current = env::var_os("PATH").unwrap_or_default();
    let mut paths = vec![PathBuf::from(dir)];
    paths.extend(env::split_paths(&current));
    if let Ok(joined) = env::join_paths(paths) {
        env::set_var("PATH", joined);
    }
}

/// Probe a candidate executable by running `--version` under a short timeout.
/// Valid only if the process exits successfully and prints the blender
/// marker. Never raises: a missing or broken candidate is simply `false`.
pub fn is_blender_bin(path: &str) -> bool {
    if !is_path_exists(path) {
        return false;
    }
    match run_version_command(path, PROBE_TIMEOUT) {
        Some(probe) => probe.success && probe.stdout.contains(BLENDER_MARKER),
        None => false,
    }
}

/// Extract the long-form version line from a validated executable, scanning
/// both output streams under a more generous timeout.
pub fn blender_version(path: &str) -> Option<String> {
    let probe = run_version_command(path, VERSION_TIMEOUT)?;
    let combined = format!("{}\n{}", probe.stdout, probe.stderr);
    combined
        .lines()
        .find(|line| line.starts_with(BLENDER_MARKER))
        .map(|line| line.trim().to_owned())
}

/// Parse a semantic version out of a `Blender X.Y.Z ...` marker line.
pub fn parse_blender_version(line: &str) -> Option<Version> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"Blender\s+(\d+)\.(\d+)\.(\d+)").expect("version pattern is valid")
    });
    let caps = re.captures(line)?;
    let major = caps[1].parse().ok()?;
    let minor = caps[2].parse().ok()?;
    let patch = caps[3].parse().ok()?;
    Some(Version::new(major, minor, patch))
}

/// Enumerate known blender executables: the configured `bin_paths` plus one
/// discovered on the search path, deduplicated by path and each validated
/// before inclusion. Values are the cached version lines.
pub fn blender_paths(config: &ConfigManager) -> BTreeMap<String, String> {
    let mut found = BTreeMap::new();

    if let Some(paths) = config
        .get_variable(config::BIN_PATHS)
        .and_then(|value| value.as_object())
    {
        for path in paths.keys() {
            if is_blender_bin(path) {
                if let Some(version) = blender_version(path) {
                    found.insert(path.clone(), version);
                }
            }
        }
    }

    if let Some(discovered) = which("blender") {
        let path = discovered.to_string_lossy().to_string();
        if !found.contains_key(&path) && is_blender_bin(&path) {
            if let Some(version) = blender_version(&path) {
                found.insert(path, version);
            }
        }
    }

    found
}

/// Locate an executable on the process search path.
fn which(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    let file_name = format!("{}{}", name, env::consts::EXE_SUFFIX);
    env::split_paths(&paths)
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
}

struct ProbeOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

/// Run `<path> --version` with piped output, killing the child once the
/// timeout elapses. Returns `None` on launch failure or timeout.
fn run_version_command(path: &str, timeout: Duration) -> Option<ProbeOutput> {
    let mut child = Command::new(path)
        .arg("--version")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(Stdio::null())
        .spawn()
        .ok()?;

    // pipes are drained on worker threads so a chatty child cannot block
    let stdout_worker = child.stdout.take().map(read_to_string_thread);
    let stderr_worker = child.stderr.take().map(read_to_string_thread);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    log::warn!("version probe of {path} timed out, killing it");
                    let _ = child.kill();
                    let _ = child.wait();
                    return None;
                }
                thread::sleep(Duration::from_millis(25));
            }
            Err(err) => {
                log::warn!("version probe of {path} failed: {err}");
                return None;
            }
        }
    };

    let stdout = stdout_worker
        .and_then(|worker| worker.join().ok())
        .unwrap_or_default();
    let stderr = stderr_worker
        .and_then(|worker| worker.join().ok())
        .unwrap_or_default();

    Some(ProbeOutput {
        success: status.success(),
        stdout,
        stderr,
    })
}

fn read_to_string_thread<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = String::new();
        let _ = pipe.read_to_string(&mut buffer);
        buffer
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::tempdir;

    #[cfg(unix)]
    fn write_fake_bin(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let _ = env_logger::builder().is_test(true).try_init();
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn transform_path_uses_platform_separator() {
        let sep = MAIN_SEPARATOR.to_string();
        assert_eq!(
            transform_path_to_standard("C:/work/scripts/render_script.py"),
            format!("C:{sep}work{sep}scripts{sep}render_script.py")
        );
        assert_eq!(
            transform_path_to_standard("C:\\work\\thumbnails"),
            format!("C:{sep}work{sep}thumbnails")
        );
    }

    #[test]
    fn file_name_handles_both_separators() {
        assert_eq!(file_name_from_path("C:\\projects\\test.blend"), "test.blend");
        assert_eq!(file_name_from_path("/home/user/test.blend"), "test.blend");
        assert_eq!(file_name_from_path("test.blend"), "test.blend");
    }

    #[test]
    fn empty_path_does_not_exist() {
        assert!(!is_path_exists(""));
        assert!(!is_path_exists("/no/such/path/anywhere.blend"));
    }

    #[test]
    fn cpu_count_is_at_least_one() {
        assert!(cpu_count() >= 1);
    }

    #[test]
    fn missing_executable_probes_false_without_error() {
        assert!(!is_blender_bin("/no/such/blender"));
        assert_eq!(blender_version("/no/such/blender"), None);
    }

    #[test]
    fn parse_version_from_marker_line() {
        let version = parse_blender_version("Blender 4.1.0 (hash e1743a0317bc)").unwrap();
        assert_eq!(version, Version::new(4, 1, 0));
        assert_eq!(parse_blender_version("not a marker line"), None);
    }

    #[test]
    fn unvalidated_candidates_are_not_listed() {
        let dir = tempdir().unwrap();
        let mut config = ConfigManager::load(dir.path().join("config.json")).unwrap();
        config
            .set_variable(
                config::BIN_PATHS,
                serde_json::json!({ "/no/such/blender": "Blender 4.1.0" }),
            )
            .unwrap();

        let paths = blender_paths(&config);
        assert!(!paths.contains_key("/no/such/blender"));
    }

    #[test]
    fn prepend_to_path_puts_directory_first() {
        // PATH is process-global; restore it so sibling tests that resolve
        // executables are unaffected
        let saved = env::var_os("PATH");
        prepend_to_path("/tmp/blendqueue-test-bin");
        let path = env::var("PATH").unwrap();
        if let Some(saved) = saved {
            env::set_var("PATH", saved);
        }
        assert!(path.starts_with("/tmp/blendqueue-test-bin"));
    }

    #[cfg(unix)]
    #[test]
    fn fake_blender_passes_the_probe() {
        let dir = tempdir().unwrap();
        let bin = write_fake_bin(dir.path(), "blender", "echo \"Blender 4.1.0\"");
        let bin = bin.to_string_lossy().to_string();

        assert!(is_blender_bin(&bin));
        assert_eq!(blender_version(&bin).as_deref(), Some("Blender 4.1.0"));
    }

    #[cfg(unix)]
    #[test]
    fn non_blender_executable_fails_the_probe() {
        let dir = tempdir().unwrap();
        let bin = write_fake_bin(dir.path(), "impostor", "echo \"definitely not it\"");
        assert!(!is_blender_bin(&bin.to_string_lossy()));
    }

    #[cfg(unix)]
    #[test]
    fn hung_candidate_is_killed_and_rejected() {
        let dir = tempdir().unwrap();
        let bin = write_fake_bin(dir.path(), "sleepy", "sleep 30");
        let started = Instant::now();
        assert!(!is_blender_bin(&bin.to_string_lossy()));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn validated_candidates_are_listed_with_versions() {
        let dir = tempdir().unwrap();
        let bin = write_fake_bin(dir.path(), "blender", "echo \"Blender 3.6.2\"");
        let bin = bin.to_string_lossy().to_string();

        let mut config = ConfigManager::load(dir.path().join("config.json")).unwrap();
        let mut bins = serde_json::Map::new();
        bins.insert(bin.clone(), serde_json::Value::String(String::new()));
        config
            .set_variable(config::BIN_PATHS, serde_json::Value::Object(bins))
            .unwrap();

        let paths = blender_paths(&config);
        assert_eq!(paths.get(&bin).map(String::as_str), Some("Blender 3.6.2"));
    }
}
