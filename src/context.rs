use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use directories::ProjectDirs;

use draft_advisor::error::{AdvisorError, Res};

const APP_NAME: &str = "draft-advisor";
const APP_AUTHOR: &str = "draft-advisor";
const APP_QUALIFIER: &str = "com";

const CONFIG_FILE_NAME: &str = "advisor.json";
const RUNTIME_FILE_NAME: &str = "runtime_data.json";

/// Overrides the location of the configuration file.
pub const CONFIG_PATH_VAR: &str = "DRAFT_ADVISOR_CONFIG";

pub const LAST_DATASET_KEY: &str = "last_dataset";
pub const LAST_EVENTS_KEY: &str = "last_events";

/// Paths and small runtime values remembered between sessions.
pub struct Context {
    pub data: Arc<RwLock<HashMap<String, String>>>,
    pub config_path: PathBuf,
    runtime_file_path: PathBuf,
}

pub fn create_context() -> Res<Context> {
    let project_dirs = ProjectDirs::from(APP_QUALIFIER, APP_AUTHOR, APP_NAME)
        .ok_or_else(|| AdvisorError::Config("no home directory".to_string()))?;

    let runtime_dir = project_dirs.data_local_dir();
    log::debug!("Runtime directory: {}", runtime_dir.display());
    std::fs::create_dir_all(runtime_dir)?;

    let config_path = resolve_config_path(
        std::env::var(CONFIG_PATH_VAR).ok(),
        project_dirs.config_dir(),
    );
    load_data_from_file(&runtime_dir.join(RUNTIME_FILE_NAME), config_path)
}

pub fn resolve_config_path(overridden: Option<String>, config_dir: &Path) -> PathBuf {
    match overridden {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path.trim()),
        _ => config_dir.join(CONFIG_FILE_NAME),
    }
}

pub fn load_data_from_file(runtime_file_path: &Path, config_path: PathBuf) -> Res<Context> {
    let data = if runtime_file_path.exists() {
        let contents = std::fs::read_to_string(runtime_file_path)?;
        serde_json::from_str::<HashMap<String, String>>(&contents)?
    } else {
        HashMap::new()
    };

    Ok(Context {
        data: Arc::new(RwLock::new(data)),
        config_path,
        runtime_file_path: runtime_file_path.to_path_buf(),
    })
}

impl Context {
    pub fn read_data(&self, key: &str) -> Option<String> {
        let data_read = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data_read.get(key).map(|s| s.to_string())
    }

    pub fn write_data(&self, key: &str, value: &str) -> Res<()> {
        let mut data_write = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data_write.insert(key.to_string(), value.to_string());
        save_data(&self.runtime_file_path, &data_write)
    }
}

fn save_data(runtime_file_path: &Path, data: &HashMap<String, String>) -> Res<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(runtime_file_path)?;
    let content = serde_json::to_string(data)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
