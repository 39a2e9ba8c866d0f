use dotenv::dotenv;
use std::env;
use std::time::Duration;

/// Intervallo di polling predefinito del thread aperto
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Token bearer emesso dal servizio di autenticazione (assente per il form pubblico)
    pub token: Option<String>,
    pub poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            token: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Carica la configurazione dalle variabili d'ambiente
    /// (`CONTACT_API_URL`, `CONTACT_TOKEN`, `POLL_INTERVAL_SECS`).
    /// Chiama dotenv() automaticamente
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();
        let defaults = Self::default();

        let base_url = env::var("CONTACT_API_URL").unwrap_or(defaults.base_url);
        let token = env::var("CONTACT_TOKEN").ok().filter(|t| !t.is_empty());
        let poll_interval = match env::var("POLL_INTERVAL_SECS") {
            Ok(raw) => parse_poll_interval(&raw)?,
            Err(_) => defaults.poll_interval,
        };

        Ok(Self {
            base_url,
            token,
            poll_interval,
        })
    }
}

/// Secondi interi e positivi: un intervallo nullo non è ammesso
fn parse_poll_interval(raw: &str) -> Result<Duration, String> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err("Invalid POLL_INTERVAL_SECS: must be at least 1 second".to_string()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err("Invalid POLL_INTERVAL_SECS: must be a number".to_string()),
    }
}
