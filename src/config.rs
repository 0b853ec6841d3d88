//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use config::{Config, ConfigError, Environment};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

/// 运行模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    Development,
    Production,
}

impl RuntimeMode {
    /// Development mode echoes full error detail to clients.
    pub fn is_development(self) -> bool {
        matches!(self, RuntimeMode::Development)
    }

    /// Cookies carry the `Secure` flag everywhere except development.
    pub fn secure_cookies(self) -> bool {
        !self.is_development()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:3000"
    pub addr: String,
    /// 运行模式: development, production
    pub mode: RuntimeMode,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
    /// 允许跨域的来源
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库连接 URL（使用 Secret 包装，防止日志泄露）
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    /// 获取连接超时时间（秒）
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// JWT 签名密钥（使用 Secret 包装，防止日志泄露）
    pub jwt_secret: Secret<String>,
    /// 访问令牌有效期（小时）
    pub access_token_ttl_hours: u64,
    /// 刷新令牌有效期（天）
    pub refresh_token_ttl_days: u64,
    /// 密码重置令牌有效期（分钟）
    pub reset_token_ttl_mins: u64,
    /// 密码最小长度
    pub password_min_length: usize,
    /// Argon2 内存开销（KiB）
    pub hash_memory_kib: u32,
    /// Argon2 迭代次数
    pub hash_iterations: u32,
}

impl SecurityConfig {
    pub fn access_token_ttl_secs(&self) -> u64 {
        self.access_token_ttl_hours * 60 * 60
    }

    pub fn refresh_token_ttl_secs(&self) -> u64 {
        self.refresh_token_ttl_days * 24 * 60 * 60
    }
}

/// 邮件投递方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    /// 仅写入日志（开发环境）
    Log,
    /// POST JSON 到邮件中继服务
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub transport: MailTransport,
    /// 发件人地址
    pub from: String,
    /// 邮件中继地址（transport = http 时必填）
    pub endpoint: Option<String>,
    /// 中继服务的 Bearer 令牌
    pub api_key: Option<Secret<String>>,
    /// 重置链接的前缀，未设置时由请求的 Host 推导
    pub reset_url_base: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        settings = settings
            .set_default("server.addr", "0.0.0.0:3000")?
            .set_default("server.mode", "development")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("server.allowed_origins", Vec::<String>::new())?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.idle_timeout_secs", 600)?
            .set_default("database.max_lifetime_secs", 1800)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("security.jwt_secret", "change-this-secret-in-production-min-32-chars!")?
            .set_default("security.access_token_ttl_hours", 1)?
            .set_default("security.refresh_token_ttl_days", 7)?
            .set_default("security.reset_token_ttl_mins", 10)?
            .set_default("security.password_min_length", 8)?
            .set_default("security.hash_memory_kib", 65536)?
            .set_default("security.hash_iterations", 3)?
            .set_default("mail.transport", "log")?
            .set_default("mail.from", "no-reply@gallery.local")?;

        // 从环境变量加载配置（前缀为 GALLERY_）
        settings = settings.add_source(
            Environment::with_prefix("GALLERY")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins")
                .try_parsing(true),
        );

        let config: AppConfig = settings.build()?.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(port_str) = self.server.addr.split(':').next_back() {
            if let Ok(port) = port_str.parse::<u16>() {
                if port != 0 && port < 1024 {
                    return Err(ConfigError::Message("Server port should be >= 1024".to_string()));
                }
            }
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        if self.database.max_connections < self.database.min_connections {
            return Err(ConfigError::Message(
                "max_connections must be >= min_connections".to_string(),
            ));
        }

        // HS256 密钥至少 32 字符
        if self.security.jwt_secret.expose_secret().len() < 32 {
            return Err(ConfigError::Message(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        if !(1..=72).contains(&self.security.access_token_ttl_hours) {
            return Err(ConfigError::Message(
                "access_token_ttl_hours must be between 1 and 72".to_string(),
            ));
        }

        if !(1..=90).contains(&self.security.refresh_token_ttl_days) {
            return Err(ConfigError::Message(
                "refresh_token_ttl_days must be between 1 and 90".to_string(),
            ));
        }

        // 刷新令牌必须比访问令牌活得更久
        if self.security.refresh_token_ttl_secs() <= self.security.access_token_ttl_secs() {
            return Err(ConfigError::Message(
                "refresh token TTL must exceed access token TTL".to_string(),
            ));
        }

        if !(1..=1440).contains(&self.security.reset_token_ttl_mins) {
            return Err(ConfigError::Message(
                "reset_token_ttl_mins must be between 1 and 1440".to_string(),
            ));
        }

        if self.security.password_min_length < 6 || self.security.password_min_length > 128 {
            return Err(ConfigError::Message(
                "password_min_length must be between 6 and 128".to_string(),
            ));
        }

        if self.security.hash_memory_kib < 1024 || self.security.hash_iterations < 1 {
            return Err(ConfigError::Message(
                "hash_memory_kib must be >= 1024 and hash_iterations >= 1".to_string(),
            ));
        }

        if self.mail.transport == MailTransport::Http && self.mail.endpoint.is_none() {
            return Err(ConfigError::Message(
                "mail.endpoint is required when mail.transport = http".to_string(),
            ));
        }

        Ok(())
    }
}
