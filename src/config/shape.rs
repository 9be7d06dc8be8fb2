use std::path::PathBuf;

use cohort_lib::FormConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Remote {
    pub url: Option<String>,
    pub timeout: Option<u64>,
    pub cookies: Option<PathBuf>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub remote: Option<Remote>,

    /// rules are written as single key maps (`- method: cohortName`) in both
    /// yaml and json
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub form: Option<FormConfig>,
}
