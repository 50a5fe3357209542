use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub stripe: StripeConfig,
    #[serde(default)]
    pub places: PlacesConfig,
    #[serde(default)]
    pub claude: ClaudeConfig,
    #[serde(default)]
    pub usage: UsageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64,  // seconds
    pub refresh_token_expires_in: i64, // seconds
}

/// Stripe 订阅价格 ID，每个套餐一个
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    #[serde(default)]
    pub price_free: Option<String>,
    #[serde(default)]
    pub price_basic: Option<String>,
    #[serde(default)]
    pub price_pro: Option<String>,
    #[serde(default)]
    pub price_enterprise: Option<String>,
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    pub api_key: String,
    #[serde(default = "default_places_base_url")]
    pub base_url: String,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_places_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeConfig {
    pub api_key: String,
    #[serde(default = "default_claude_base_url")]
    pub base_url: String,
    #[serde(default = "default_claude_model")]
    pub model: String,
    #[serde(default = "default_claude_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_claude_base_url(),
            model: default_claude_model(),
            max_tokens: default_claude_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UsageConfig {
    /// 开启后按 usage_reset_date 每月自动清零用量（默认只在订阅时清零）
    #[serde(default)]
    pub monthly_rollover: bool,
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_places_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_claude_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_claude_model() -> String {
    "claude-sonnet-4-5".to_string()
}

fn default_claude_max_tokens() -> u32 {
    8192
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                // 有配置文件：先解析再用环境变量覆盖
                toml::from_str(&config_str)
                    .map_err(|e| format!("Failed to parse config file: {e}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用环境变量与默认值构建
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                let database_url = get_env("DATABASE_URL")
                    .ok_or("DATABASE_URL is not set and config.toml was not found")?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    jwt: JwtConfig {
                        secret: get_env("JWT_SECRET")
                            .unwrap_or_else(|| "change-me-in-production".to_string()),
                        access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 7200i64),
                        refresh_token_expires_in: get_env_parse(
                            "JWT_REFRESH_EXPIRES_IN",
                            2_592_000i64,
                        ),
                    },
                    stripe: StripeConfig {
                        frontend_url: default_frontend_url(),
                        ..Default::default()
                    },
                    places: PlacesConfig::default(),
                    claude: ClaudeConfig::default(),
                    usage: UsageConfig::default(),
                }
            }
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// 环境变量覆盖（即便文件存在时也覆盖）
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("JWT_REFRESH_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.refresh_token_expires_in = n;
        }

        // Stripe
        if let Ok(v) = env::var("STRIPE_SECRET_KEY") {
            self.stripe.secret_key = v;
        }
        if let Ok(v) = env::var("STRIPE_WEBHOOK_SECRET") {
            self.stripe.webhook_secret = v;
        }
        if let Ok(v) = env::var("STRIPE_PRICE_FREE") {
            self.stripe.price_free = Some(v);
        }
        if let Ok(v) = env::var("STRIPE_PRICE_BASIC") {
            self.stripe.price_basic = Some(v);
        }
        if let Ok(v) = env::var("STRIPE_PRICE_PRO") {
            self.stripe.price_pro = Some(v);
        }
        if let Ok(v) = env::var("STRIPE_PRICE_ENTERPRISE") {
            self.stripe.price_enterprise = Some(v);
        }
        if let Ok(v) = env::var("FRONTEND_URL") {
            self.stripe.frontend_url = v;
        }

        // Google Places
        if let Ok(v) = env::var("PLACES_API_KEY") {
            self.places.api_key = v;
        }
        if let Ok(v) = env::var("PLACES_BASE_URL") {
            self.places.base_url = v;
        }

        // Claude
        if let Ok(v) = env::var("CLAUDE_API_KEY") {
            self.claude.api_key = v;
        }
        if let Ok(v) = env::var("CLAUDE_BASE_URL") {
            self.claude.base_url = v;
        }
        if let Ok(v) = env::var("CLAUDE_MODEL") {
            self.claude.model = v;
        }
        if let Ok(v) = env::var("CLAUDE_MAX_TOKENS")
            && let Ok(n) = v.parse()
        {
            self.claude.max_tokens = n;
        }

        if let Ok(v) = env::var("USAGE_MONTHLY_ROLLOVER") {
            self.usage.monthly_rollover = matches!(v.as_str(), "1" | "true" | "yes");
        }
    }
}
