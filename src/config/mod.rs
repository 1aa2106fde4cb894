//! Layered `.sfreport.toml` settings and Screaming Frog binary resolution.
//!
//! Settings are read from `~/.sfreport.toml` (user) and `./.sfreport.toml`
//! (project); project values override user values key by key. The crawler
//! binary is resolved from an ordered list of candidates: explicit override,
//! project config, user config, then the platform default.
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

pub const SETTINGS_FILE_NAME: &str = ".sfreport.toml";

/// Crawler config used by `crawl` when none is given on the command line
pub const DEFAULT_SEOSPIDER_CONFIG: &str = "config/Accessibility.seospiderconfig";

pub const DEFAULT_EXPORTS_DIR: &str = "exports";

#[cfg(target_os = "macos")]
const PLATFORM_DEFAULT_BINARY: &str =
    "/Applications/Screaming Frog SEO Spider.app/Contents/MacOS/ScreamingFrogSEOSpiderLauncher";
#[cfg(target_os = "windows")]
const PLATFORM_DEFAULT_BINARY: &str =
    r"C:\Program Files (x86)\Screaming Frog SEO Spider\ScreamingFrogSEOSpiderCli.exe";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const PLATFORM_DEFAULT_BINARY: &str = "/usr/bin/screamingfrogseospider";

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub screaming_frog: ScreamingFrogSettings,
    pub exports: ExportSettings,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScreamingFrogSettings {
    /// Path to the SEO Spider CLI launcher
    pub binary: Option<PathBuf>,
    /// `.seospiderconfig` applied to fresh crawls
    pub seospider_config: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExportSettings {
    /// Root folder for kept exports
    pub dir: Option<PathBuf>,
}

impl Settings {
    /// Load and merge the user and project settings files.
    pub fn load(sources: &ConfigSources) -> Result<Self> {
        let user = sources.user_settings()?.unwrap_or_default();
        let project = sources.project_settings()?.unwrap_or_default();
        Ok(user.overridden_by(project))
    }

    fn overridden_by(self, other: Settings) -> Settings {
        Settings {
            screaming_frog: ScreamingFrogSettings {
                binary: other.screaming_frog.binary.or(self.screaming_frog.binary),
                seospider_config: other
                    .screaming_frog
                    .seospider_config
                    .or(self.screaming_frog.seospider_config),
            },
            exports: ExportSettings {
                dir: other.exports.dir.or(self.exports.dir),
            },
        }
    }

    pub fn exports_root(&self) -> PathBuf {
        self.exports
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORTS_DIR))
    }

    /// Crawler config for a fresh crawl: the configured one, else the bundled
    /// accessibility config when present in the working directory.
    pub fn default_seospider_config(&self) -> Option<PathBuf> {
        if let Some(path) = &self.screaming_frog.seospider_config {
            return Some(expand_home(path));
        }
        let bundled = PathBuf::from(DEFAULT_SEOSPIDER_CONFIG);
        bundled.is_file().then_some(bundled)
    }
}

/// Locations of the two settings layers
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub user: Option<PathBuf>,
    pub project: Option<PathBuf>,
}

impl ConfigSources {
    pub fn new(user: Option<PathBuf>, project: Option<PathBuf>) -> Self {
        Self { user, project }
    }

    /// `~/.sfreport.toml` and `./.sfreport.toml`
    pub fn discover() -> Self {
        Self {
            user: dirs::home_dir().map(|home| home.join(SETTINGS_FILE_NAME)),
            project: Some(PathBuf::from(SETTINGS_FILE_NAME)),
        }
    }

    fn user_settings(&self) -> Result<Option<Settings>> {
        match &self.user {
            Some(path) => read_settings_file(path),
            None => Ok(None),
        }
    }

    fn project_settings(&self) -> Result<Option<Settings>> {
        match &self.project {
            Some(path) => read_settings_file(path),
            None => Ok(None),
        }
    }
}

fn read_settings_file(path: &Path) -> Result<Option<Settings>> {
    if !path.is_file() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let settings = toml::from_str::<Settings>(&raw).map_err(|e| Error::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!("Loaded settings from {:?}", path);
    Ok(Some(settings))
}

/// Where a binary candidate came from
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BinarySource {
    Override,
    ProjectConfig,
    UserConfig,
    PlatformDefault,
}

impl std::fmt::Display for BinarySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinarySource::Override => write!(f, "--sf-binary"),
            BinarySource::ProjectConfig => write!(f, "project config"),
            BinarySource::UserConfig => write!(f, "user config"),
            BinarySource::PlatformDefault => write!(f, "platform default"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryCandidate {
    pub source: BinarySource,
    pub path: PathBuf,
}

pub fn platform_default_binary() -> PathBuf {
    PathBuf::from(PLATFORM_DEFAULT_BINARY)
}

/// Ordered binary candidates, highest precedence first.
pub fn binary_candidates(
    override_path: Option<&Path>,
    sources: &ConfigSources,
    platform_default: &Path,
) -> Result<Vec<BinaryCandidate>> {
    let mut candidates = Vec::with_capacity(4);
    if let Some(path) = override_path {
        candidates.push(BinaryCandidate {
            source: BinarySource::Override,
            path: expand_home(path),
        });
    }
    if let Some(path) = sources
        .project_settings()?
        .and_then(|s| s.screaming_frog.binary)
    {
        candidates.push(BinaryCandidate {
            source: BinarySource::ProjectConfig,
            path: expand_home(&path),
        });
    }
    if let Some(path) = sources.user_settings()?.and_then(|s| s.screaming_frog.binary) {
        candidates.push(BinaryCandidate {
            source: BinarySource::UserConfig,
            path: expand_home(&path),
        });
    }
    candidates.push(BinaryCandidate {
        source: BinarySource::PlatformDefault,
        path: platform_default.to_path_buf(),
    });
    Ok(candidates)
}

/// First candidate that exists and is executable.
pub fn first_executable(candidates: &[BinaryCandidate]) -> Result<PathBuf> {
    for candidate in candidates {
        if is_executable(&candidate.path) {
            debug!(
                "Using Screaming Frog binary from {}: {:?}",
                candidate.source, candidate.path
            );
            return Ok(candidate.path.clone());
        }
        debug!(
            "Skipping {} binary {:?}: not an executable file",
            candidate.source, candidate.path
        );
    }
    Err(Error::BinaryNotFound {
        tried: candidates.iter().map(|c| c.path.clone()).collect(),
    })
}

/// Resolve the Screaming Frog binary: override, project config, user config, platform default.
pub fn resolve_binary(override_path: Option<&Path>, sources: &ConfigSources) -> Result<PathBuf> {
    let candidates = binary_candidates(override_path, sources, &platform_default_binary())?;
    first_executable(&candidates)
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    match fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(path: &Path, contents: &str) {
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn project_values_override_user_values() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("user.toml");
        let project = dir.path().join("project.toml");
        write(
            &user,
            "[screaming_frog]\nbinary = \"/opt/user/sf\"\nseospider_config = \"a.seospiderconfig\"\n\n[exports]\ndir = \"/tmp/user-exports\"\n",
        );
        write(&project, "[screaming_frog]\nbinary = \"/opt/project/sf\"\n");

        let settings =
            Settings::load(&ConfigSources::new(Some(user), Some(project))).unwrap();
        assert_eq!(
            settings.screaming_frog.binary,
            Some(PathBuf::from("/opt/project/sf"))
        );
        assert_eq!(
            settings.screaming_frog.seospider_config,
            Some(PathBuf::from("a.seospiderconfig"))
        );
        assert_eq!(settings.exports_root(), PathBuf::from("/tmp/user-exports"));
    }

    #[test]
    fn missing_files_yield_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let sources = ConfigSources::new(
            Some(dir.path().join("nope.toml")),
            Some(dir.path().join("also-nope.toml")),
        );
        let settings = Settings::load(&sources).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.exports_root(), PathBuf::from(DEFAULT_EXPORTS_DIR));
    }

    #[test]
    fn malformed_file_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("broken.toml");
        write(&project, "[screaming_frog\nbinary = 3");
        let err = Settings::load(&ConfigSources::new(None, Some(project.clone()))).unwrap_err();
        match err {
            Error::Config { path, .. } => assert_eq!(path, project),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn candidates_follow_precedence_order() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("user.toml");
        let project = dir.path().join("project.toml");
        write(&user, "[screaming_frog]\nbinary = \"/u/sf\"\n");
        write(&project, "[screaming_frog]\nbinary = \"/p/sf\"\n");

        let candidates = binary_candidates(
            Some(Path::new("/o/sf")),
            &ConfigSources::new(Some(user), Some(project)),
            Path::new("/default/sf"),
        )
        .unwrap();
        let sources: Vec<BinarySource> = candidates.iter().map(|c| c.source).collect();
        assert_eq!(
            sources,
            vec![
                BinarySource::Override,
                BinarySource::ProjectConfig,
                BinarySource::UserConfig,
                BinarySource::PlatformDefault,
            ]
        );
        assert_eq!(candidates[0].path, PathBuf::from("/o/sf"));
        assert_eq!(candidates[3].path, PathBuf::from("/default/sf"));
    }

    #[test]
    fn no_executable_candidate_is_binary_not_found() {
        let candidates = vec![BinaryCandidate {
            source: BinarySource::PlatformDefault,
            path: PathBuf::from("/definitely/not/here/sf"),
        }];
        match first_executable(&candidates).unwrap_err() {
            Error::BinaryNotFound { tried } => {
                assert_eq!(tried, vec![PathBuf::from("/definitely/not/here/sf")])
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
