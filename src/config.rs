use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory
pub const CONFIG_FILE: &str = "contractor-safety.toml";

/// Main configuration structure for the contractor safety wizard
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractorSafetyConfig {
    /// Image analysis collaborator settings
    pub analyzer: AnalyzerConfig,
    /// Choices presented by the form
    pub form: FormConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Where submitted records go
    pub sink: SinkConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Gemini API key (can be set via env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API base URL
    pub endpoint: String,
    /// Model used for hazard detection
    pub model: String,
    /// HTTP timeout for one analysis call
    pub timeout_seconds: u64,
    /// Instruction sent alongside the image
    pub prompt: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            api_key: None, // Read from GEMINI_API_KEY / API_KEY in load()
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-2.5-flash".to_string(),
            timeout_seconds: 60,
            prompt: "이 작업 현장 사진에서 수행 중인 주요 작업 유형을 식별하고, 사진에서 보이는 \
                     잠재적 위험 요소를 나열하세요. 결과는 지정된 JSON 형식으로만 답하세요. \
                     작업 현장이 아닌 사진이라면 workType에 그 사실을 적고 hazards는 비워 두세요."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PledgeItem {
    pub key: String,
    pub text: String,
}

impl PledgeItem {
    fn new(key: &str, text: &str) -> Self {
        Self {
            key: key.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FormConfig {
    /// Construction sites offered for project info ("기타" is always accepted)
    pub locations: Vec<String>,
    /// Items the contractor must agree to in the safety pledge
    pub pledge_items: Vec<PledgeItem>,
    /// Safety-check labels offered on the work permit
    pub safety_checks: Vec<String>,
}

impl FormConfig {
    pub fn pledge_keys(&self) -> impl Iterator<Item = &str> {
        self.pledge_items.iter().map(|item| item.key.as_str())
    }

    /// Whether `location` is a configured site. "기타" is accepted even when
    /// the list omits it.
    pub fn is_known_location(&self, location: &str) -> bool {
        location == crate::form::OTHER_LOCATION
            || self.locations.iter().any(|site| site == location)
    }

    pub fn is_known_safety_check(&self, label: &str) -> bool {
        self.safety_checks.iter().any(|check| check == label)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            locations: vec![
                "본사".to_string(),
                "오송 공장".to_string(),
                "천안 공장".to_string(),
                "효종연구소".to_string(),
                crate::form::OTHER_LOCATION.to_string(),
            ],
            pledge_items: vec![
                PledgeItem::new("ppe", "작업 중 지정된 개인보호구를 항상 착용합니다."),
                PledgeItem::new("permit", "작업 허가서에 기재된 범위와 시간 내에서만 작업합니다."),
                PledgeItem::new("no_smoking", "지정된 장소 외에서 흡연하거나 화기를 사용하지 않습니다."),
                PledgeItem::new("report", "사고나 위험 상황 발생 시 즉시 담당자에게 보고합니다."),
                PledgeItem::new("housekeeping", "작업 종료 후 주변을 정리정돈합니다."),
            ],
            safety_checks: vec![
                "작업 구역 통제 및 표지판 설치".to_string(),
                "소화기 비치".to_string(),
                "환기 상태 확인".to_string(),
                "가스 농도 측정".to_string(),
                "전원 차단 및 잠금 표지".to_string(),
                "감시인 배치".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Output format for log lines
    pub log_format: LogFormat,
    /// Default level when RUST_LOG is unset
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SinkConfig {
    /// Directory for JSON submission files; unset logs submissions instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl ContractorSafetyConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (contractor-safety.toml, or `path` when given)
    /// 3. Environment variables (prefixed with CONTRACTOR_SAFETY_, `__` between sections)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path));
            }
            None if Path::new(CONFIG_FILE).exists() => {
                builder = builder.add_source(File::with_name(CONFIG_FILE));
            }
            None => {}
        }

        builder = builder.add_source(
            Environment::with_prefix("CONTRACTOR_SAFETY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: ContractorSafetyConfig = builder.build()?.try_deserialize()?;

        // API key fallbacks, matching the variable names the web client used
        if config.analyzer.api_key.as_deref().map_or(true, str::is_empty) {
            config.analyzer.api_key = ["GEMINI_API_KEY", "API_KEY"]
                .iter()
                .find_map(|name| std::env::var(name).ok().filter(|key| !key.is_empty()));
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
