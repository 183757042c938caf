use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::email::Locale;

pub const DEFAULT_GATEWAY_URL: &str = "https://api.maxelpay.com/v1/payments";
pub const DEFAULT_ORIGIN: &str = "https://luxio.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Non-production mode: internal error details are returned to clients
    pub dev_mode: bool,
    /// Fallback origin for gateway redirect URLs when the request has no Origin header
    pub default_origin: String,
    /// Present only when both MAXELPAY_KEY and MAXELPAY_SECRET are set
    pub gateway: Option<GatewayConfig>,
    /// Shared webhook secret (MAXELPAY_SECRET), independent of the API key
    pub webhook_secret: Option<String>,
    /// Present only when every mail variable is set
    pub mail: Option<MailConfig>,
    pub locale: Locale,
    pub catalog_path: PathBuf,
    /// Cart/wishlist file store; in-memory when unset
    pub cart_store_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub api_secret: String,
    pub endpoint: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub shop_email: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("LUXIO_ENV")
            .or_else(|_| env::var("NODE_ENV"))
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let webhook_secret = non_empty("MAXELPAY_SECRET");

        let gateway = match (non_empty("MAXELPAY_KEY"), webhook_secret.clone()) {
            (Some(api_key), Some(api_secret)) => Some(GatewayConfig {
                api_key,
                api_secret,
                endpoint: env::var("MAXELPAY_API_URL")
                    .unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string()),
                timeout: secs_from_env("MAXELPAY_TIMEOUT_SECS", 30),
            }),
            _ => None,
        };

        let mail = match (
            non_empty("SHOP_EMAIL"),
            non_empty("MAIL_HOST"),
            non_empty("MAIL_PORT").and_then(|p| p.parse::<u16>().ok()),
            non_empty("MAIL_USER"),
            non_empty("MAIL_PASS"),
        ) {
            (Some(shop_email), Some(host), Some(port), Some(username), Some(password)) => {
                Some(MailConfig {
                    host,
                    port,
                    username,
                    password,
                    shop_email,
                    timeout: secs_from_env("MAIL_TIMEOUT_SECS", 30),
                })
            }
            _ => None,
        };

        let locale = env::var("LUXIO_LOCALE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Self {
            host,
            port,
            dev_mode,
            default_origin: env::var("DEFAULT_ORIGIN")
                .unwrap_or_else(|_| DEFAULT_ORIGIN.to_string()),
            gateway,
            webhook_secret,
            mail,
            locale,
            catalog_path: env::var("CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("public/data/products.json")),
            cart_store_path: env::var("CART_STORE_PATH").ok().map(PathBuf::from),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn secs_from_env(key: &str, default: u64) -> Duration {
    let secs = env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default);
    Duration::from_secs(secs)
}
