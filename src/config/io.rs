//! Config I/O operations: load and save.

use std::path::PathBuf;

use super::Config;

pub fn get_config_path() -> PathBuf {
    let config_dir = dirs::config_dir().unwrap_or_default().join("voicepad");
    let _ = std::fs::create_dir_all(&config_dir);
    config_dir.join("config_v1.json")
}

pub fn load_config() -> Config {
    let path = get_config_path();
    if path.exists() {
        let data = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&data).unwrap_or_default()
    } else {
        Config::default()
    }
}

pub fn save_config(config: &Config) {
    let path = get_config_path();
    let data = serde_json::to_string_pretty(config).unwrap();
    let _ = std::fs::write(path, data);
}
