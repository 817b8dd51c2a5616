use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let mut map = default_map();
        let config_path = default_config_path();

        // Read .agentrc if exists
        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        // ENV first
        if let Ok(v) = env::var(key) {
            return Some(v);
        }
        self.inner.get(key).cloned()
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.parse::<u64>().ok())
    }

    pub fn api_key(&self) -> Option<String> {
        self.get("GROQ_API_KEY").filter(|v| !v.trim().is_empty())
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(self.get("DATA_PATH").unwrap())
    }

    pub fn plot_dir(&self) -> PathBuf {
        PathBuf::from(self.get("PLOT_DIR").unwrap())
    }

    pub fn python_bin(&self) -> String {
        self.get("PYTHON_BIN").unwrap()
    }
}

fn is_config_key(k: &str) -> bool {
    const KEYS: &[&str] = &[
        "GROQ_API_KEY",
        "API_BASE_URL",
        "REQUEST_TIMEOUT",
        "DATA_PATH",
        "PLOT_DIR",
        "PYTHON_BIN",
    ];

    KEYS.contains(&k) || k.starts_with("TITANIC_AGENT_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("titanic_agent").join(".agentrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();
    let temp = env::temp_dir().join("titanic_agent");

    m.insert(
        "PLOT_DIR".into(),
        temp.join("plots").to_string_lossy().into_owned(),
    );
    m.insert("DATA_PATH".into(), "data/titanic.csv".into());
    m.insert("PYTHON_BIN".into(), "python3".into());

    m.insert("REQUEST_TIMEOUT".into(), "60".into());
    m.insert("API_BASE_URL".into(), "https://api.groq.com/openai/v1".into());

    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_present() {
        let m = default_map();
        assert_eq!(m.get("PYTHON_BIN").map(String::as_str), Some("python3"));
        assert!(m.get("API_BASE_URL").unwrap().contains("groq"));
    }

    #[test]
    fn recognizes_known_keys() {
        assert!(is_config_key("GROQ_API_KEY"));
        assert!(is_config_key("TITANIC_AGENT_EXPERIMENTAL"));
        assert!(!is_config_key("PATH"));
    }
}
