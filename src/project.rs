use crate::config::{self, ConfigManager};
use crate::models::settings::RenderSettings;
use crate::util;
use rand::Rng;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Working directory is not set in the configuration store")]
    NoWorkDirectory,
}

/// One queued blend file: its path, display identifier and render settings.
///
/// The identifier is the file's base name plus a random 4-digit suffix. Two
/// queued files with the same base name can collide (roughly 1 in 9000 per
/// pair); the original tool accepts that and so do we.
#[derive(Debug, Clone)]
pub struct Project {
    pub file_path: PathBuf,
    pub unique_name: String,
    pub thumbnail_path: PathBuf,
    settings: Option<RenderSettings>,
}

impl Project {
    pub fn new(
        file_path: impl Into<PathBuf>,
        config: &ConfigManager,
    ) -> Result<Self, ProjectError> {
        let suffix = rand::thread_rng().gen_range(1000..=9999);
        Self::with_suffix(file_path, config, suffix)
    }

    /// Construct with a caller-chosen suffix. Used by tests and by callers
    /// that manage identifier uniqueness themselves.
    pub fn with_suffix(
        file_path: impl Into<PathBuf>,
        config: &ConfigManager,
        suffix: u16,
    ) -> Result<Self, ProjectError> {
        let file_path = file_path.into();
        let lossy = file_path.to_string_lossy();
        let base_name = util::file_name_from_path(&lossy);
        let unique_name = format!("{base_name}_{suffix}");
        let thumbnail_path = Self::thumbnail_path_for(&unique_name, config)?;

        Ok(Self {
            file_path,
            unique_name,
            thumbnail_path,
            settings: None,
        })
    }

    /// `<work_directory>/thumbnails/<unique_name>.png`, fixed at
    /// construction time.
    fn thumbnail_path_for(
        unique_name: &str,
        config: &ConfigManager,
    ) -> Result<PathBuf, ProjectError> {
        let work_dir = config
            .get_str(config::WORK_DIRECTORY)
            .ok_or(ProjectError::NoWorkDirectory)?;
        Ok(Path::new(work_dir)
            .join("thumbnails")
            .join(format!("{unique_name}.png")))
    }

    pub fn settings(&self) -> Option<&RenderSettings> {
        self.settings.as_ref()
    }

    /// Replace the settings wholesale. No validation on assignment; the type
    /// itself guarantees completeness.
    pub fn set_settings(&mut self, settings: RenderSettings) {
        self.settings = Some(settings);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::tempdir;

    fn config_with_work_dir(dir: &Path) -> ConfigManager {
        let mut config = ConfigManager::load(dir.join("config.json")).unwrap();
        config
            .set_variable(config::WORK_DIRECTORY, dir.to_string_lossy().to_string())
            .unwrap();
        config
    }

    #[test]
    fn identifier_is_base_name_plus_suffix() {
        let dir = tempdir().unwrap();
        let config = config_with_work_dir(dir.path());
        let project = Project::with_suffix("C:\\projects\\test.blend", &config, 5678).unwrap();
        assert_eq!(project.unique_name, "test.blend_5678");
    }

    #[test]
    fn thumbnail_path_derives_from_work_directory() {
        let dir = tempdir().unwrap();
        let config = config_with_work_dir(dir.path());
        let project = Project::with_suffix("/home/user/scene.blend", &config, 1234).unwrap();
        assert_eq!(
            project.thumbnail_path,
            dir.path().join("thumbnails").join("scene.blend_1234.png")
        );
    }

    #[test]
    fn missing_work_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let config = ConfigManager::load(dir.path().join("config.json")).unwrap();
        assert!(matches!(
            Project::new("/home/user/scene.blend", &config),
            Err(ProjectError::NoWorkDirectory)
        ));
    }

    #[test]
    fn settings_start_empty_and_replace_wholesale() {
        let dir = tempdir().unwrap();
        let config = config_with_work_dir(dir.path());
        let mut project = Project::with_suffix("/home/user/scene.blend", &config, 1234).unwrap();
        assert!(project.settings().is_none());

        project.set_settings(RenderSettings::default());
        assert_eq!(project.settings(), Some(&RenderSettings::default()));

        let replacement = RenderSettings {
            frame_end: 10,
            ..Default::default()
        };
        project.set_settings(replacement.clone());
        assert_eq!(project.settings(), Some(&replacement));
    }

    #[test]
    fn random_suffix_stays_in_four_digits() {
        let dir = tempdir().unwrap();
        let config = config_with_work_dir(dir.path());
        for _ in 0..32 {
            let project = Project::new("/home/user/scene.blend", &config).unwrap();
            let suffix = project.unique_name.rsplit('_').next().unwrap();
            let suffix: u16 = suffix.parse().unwrap();
            assert!((1000..=9999).contains(&suffix));
        }
    }
}
