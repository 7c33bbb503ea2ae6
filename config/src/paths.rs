use std::path::PathBuf;

pub struct PathManager;

impl PathManager {
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("parley"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("parley"))
    }

    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("settings.toml"))
    }

    pub fn models_dir() -> Option<PathBuf> {
        Self::data_dir().map(|d| d.join("models"))
    }

    pub fn whisper_model_path() -> Option<PathBuf> {
        Self::models_dir().map(|d| d.join("ggml-base.en.bin"))
    }
}
