use crate::config::settings::ClientOverrides;
use crate::domain::script::Script;
use crate::utils::error::{ProbeError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub client: ClientOverrides,
    #[serde(default)]
    pub scripts: Vec<Script>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProbeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ProbeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${KIVA_APP_ID})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ProbeError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn script(&self, name: &str) -> Option<&Script> {
        self.scripts.iter().find(|s| s.name == name)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for script in &self.scripts {
            script.validate()?;
            if !seen.insert(script.name.as_str()) {
                return Err(ProbeError::ConfigValidationError {
                    field: "scripts.name".to_string(),
                    message: format!("script '{}' is defined twice", script.name),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::endpoint::Endpoint;
    use crate::domain::model::QueryValue;
    use crate::domain::paging::PaginationMode;
    use crate::domain::script::StepOutput;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[client]
base_url = "http://localhost:9000"
timeout_seconds = 5
max_pages = 20

[[scripts]]
name = "team-scan"
description = "Teams behind one loan"

[[scripts.steps]]
endpoint = "loan-teams"
ids = [1132720]
params = {}
paginate = { mode = "pages", limit = 5 }

[[scripts.steps]]
endpoint = "lenders-search"
params = { q = "farm", page = 1 }
output = "print"
"#;

    #[test]
    fn test_parse_scripts_and_client_section() {
        let config = TomlConfig::from_toml_str(SAMPLE).unwrap();

        assert_eq!(config.client.base_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.client.timeout_seconds, Some(5));
        assert_eq!(config.client.retry_attempts, None);

        let script = config.script("team-scan").unwrap();
        assert_eq!(script.steps.len(), 2);

        let teams = &script.steps[0];
        assert_eq!(teams.endpoint, Endpoint::LoanTeams);
        assert_eq!(teams.output, StepOutput::Discard);
        let paginate = teams.paginate.as_ref().unwrap();
        assert_eq!(paginate.mode, PaginationMode::Pages);
        assert_eq!(paginate.output, StepOutput::Print);
        assert_eq!(paginate.limit, Some(5));

        let search = &script.steps[1];
        let params = search.params.as_ref().unwrap();
        assert_eq!(params.get("q"), Some(&QueryValue::Str("farm".to_string())));
        assert_eq!(params.get("page"), Some(&QueryValue::Int(1)));
        assert!(search.paginate.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("KIVA_PROBE_TEST_APP_ID", "com.example.from-env");

        let config = TomlConfig::from_toml_str(
            r#"
[client]
app_id = "${KIVA_PROBE_TEST_APP_ID}"
"#,
        )
        .unwrap();
        assert_eq!(config.client.app_id.as_deref(), Some("com.example.from-env"));

        std::env::remove_var("KIVA_PROBE_TEST_APP_ID");
    }

    #[test]
    fn test_unknown_endpoint_fails_to_parse() {
        let result = TomlConfig::from_toml_str(
            r#"
[[scripts]]
name = "bad"

[[scripts.steps]]
endpoint = "loans-oldest"
"#,
        );
        assert!(matches!(result, Err(ProbeError::ConfigValidationError { .. })));
    }

    #[test]
    fn test_duplicate_script_names_are_rejected() {
        let config = TomlConfig::from_toml_str(
            r#"
[[scripts]]
name = "twice"
[[scripts.steps]]
endpoint = "methods"

[[scripts]]
name = "twice"
[[scripts.steps]]
endpoint = "methods"
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.scripts[0].name, "team-scan");
        assert_eq!(config.client.max_pages, Some(20));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = TomlConfig::from_file("/definitely/not/here/kiva-probe.toml");
        assert!(matches!(result, Err(ProbeError::IoError(_))));
    }
}
