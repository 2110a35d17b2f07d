//! Explicit configuration for the notification channels
//!
//! All environment lookups happen in the CLI layer; core code only ever sees
//! these structs.

use crate::notification::channel::DeliveryError;

/// Env var overriding the ntfy topic address suffix
pub const ENV_TOPIC: &str = "NOTIRUN_TOPIC";
/// Built-in default topic address suffix
pub const DEFAULT_ADDR: &str = "public";
/// Fixed push service endpoint
pub const NTFY_SERVER: &str = "https://ntfy.sh";

pub const ENV_SMTP_HOST: &str = "NOTIRUN_SMTP_HOST";
pub const ENV_SMTP_PORT: &str = "NOTIRUN_SMTP_PORT";
pub const ENV_SMTP_USER: &str = "NOTIRUN_SMTP_USER";
pub const ENV_SMTP_PASS: &str = "NOTIRUN_SMTP_PASS";
pub const ENV_FROM_ADDR: &str = "NOTIRUN_FROM_ADDR";

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Single-attempt network timeout for both channels
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Push channel configuration.
#[derive(Debug, Clone)]
pub struct NtfyConfig {
    /// Service base URL (TLS endpoint)
    pub server: String,
    /// Fully resolved topic name
    pub topic: String,
    pub timeout_secs: u64,
}

impl NtfyConfig {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            server: NTFY_SERVER.to_string(),
            topic: topic.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Resolve the topic from the explicit flag, else the env value, else the
    /// built-in default. The topic is always prefixed with `notirun-`.
    pub fn resolve_topic(flag: Option<&str>, env: Option<&str>) -> String {
        let addr = flag.or(env).unwrap_or(DEFAULT_ADDR);
        format!("notirun-{}", addr)
    }
}

/// Email channel configuration.
///
/// Credentials and addresses are optional at construction so the CLI layer
/// can assemble whatever it found; [`EmailConfig::validate`] turns gaps into
/// a configuration error before any network I/O.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub timeout_secs: u64,
}

impl EmailConfig {
    pub fn new(to: Option<String>) -> Self {
        Self {
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            user: None,
            password: None,
            from: None,
            to,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_smtp_host(mut self, host: impl Into<String>) -> Self {
        self.smtp_host = host.into();
        self
    }

    pub fn with_smtp_port(mut self, port: u16) -> Self {
        self.smtp_port = port;
        self
    }

    pub fn with_credentials(mut self, user: Option<String>, password: Option<String>) -> Self {
        self.user = user;
        self.password = password;
        self
    }

    pub fn with_from(mut self, from: Option<String>) -> Self {
        self.from = from;
        self
    }

    /// Sender address: explicit `from`, else the login user.
    pub fn sender(&self) -> Option<&str> {
        self.from.as_deref().or(self.user.as_deref())
    }

    /// Report missing credentials or recipient as a configuration error,
    /// before any network call is attempted.
    pub fn validate(&self) -> Result<(), DeliveryError> {
        if self.user.is_none() || self.password.is_none() {
            return Err(DeliveryError::Config(format!(
                "SMTP credentials not set; export {} and {}",
                ENV_SMTP_USER, ENV_SMTP_PASS
            )));
        }
        if self.sender().is_none() {
            return Err(DeliveryError::Config(format!(
                "sender address unknown; set {} or {}",
                ENV_FROM_ADDR, ENV_SMTP_USER
            )));
        }
        if self.to.is_none() {
            return Err(DeliveryError::Config(
                "no recipient address given".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_resolution_order_is_flag_env_default() {
        assert_eq!(
            NtfyConfig::resolve_topic(Some("alice"), Some("bob")),
            "notirun-alice"
        );
        assert_eq!(
            NtfyConfig::resolve_topic(None, Some("bob")),
            "notirun-bob"
        );
        assert_eq!(NtfyConfig::resolve_topic(None, None), "notirun-public");
    }

    #[test]
    fn ntfy_config_defaults() {
        let config = NtfyConfig::new("notirun-test");
        assert_eq!(config.server, "https://ntfy.sh");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn email_config_requires_credentials() {
        let config = EmailConfig::new(Some("ops@example.com".to_string()));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SMTP credentials not set"));
    }

    #[test]
    fn email_config_requires_recipient() {
        let config = EmailConfig::new(None)
            .with_credentials(Some("u@example.com".to_string()), Some("pw".to_string()));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("no recipient"));
    }

    #[test]
    fn email_sender_falls_back_to_login_user() {
        let config = EmailConfig::new(Some("ops@example.com".to_string()))
            .with_credentials(Some("u@example.com".to_string()), Some("pw".to_string()));
        assert_eq!(config.sender(), Some("u@example.com"));
        assert!(config.validate().is_ok());

        let config = config.with_from(Some("robot@example.com".to_string()));
        assert_eq!(config.sender(), Some("robot@example.com"));
    }
}
