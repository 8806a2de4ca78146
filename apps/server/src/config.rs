use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use farescout_flights::{AggregatorConfig, BookingPartner, LinkConfig, DEFAULT_API_BASE_URL};

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub api_base_url: String,
    pub provider_timeout: Duration,
    pub request_timeout: Duration,
    pub provider_order: Vec<String>,
    pub partners: Vec<BookingPartner>,
    pub aviasales_marker: Option<String>,
    pub cors_allow: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            provider_timeout: Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            provider_order: Vec::new(),
            partners: BookingPartner::ALL.to_vec(),
            aviasales_marker: None,
            cors_allow: vec!["*".to_string()],
        }
    }
}

impl Config {
    /// Read `FS_*` variables, loading `.env` first. Bad optional values
    /// fall back to their defaults; a bad listen address is an error.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr: SocketAddr = env_var("FS_LISTEN_ADDR")
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
            .parse()
            .context("Invalid FS_LISTEN_ADDR")?;
        let api_base_url = env_var("FS_API_BASE_URL").unwrap_or(defaults.api_base_url);
        let provider_timeout = env_millis("FS_PROVIDER_TIMEOUT_MS", DEFAULT_PROVIDER_TIMEOUT_MS);
        let request_timeout = env_millis("FS_REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT_MS);
        let provider_order = env_list("FS_PROVIDER_ORDER");
        let partners = parse_partners(&env_list("FS_BOOKING_PARTNERS"));
        let aviasales_marker = env_var("FS_AVIASALES_MARKER");
        let cors_allow = match env_list("FS_CORS_ALLOW_ORIGINS") {
            origins if origins.is_empty() => defaults.cors_allow,
            origins => origins,
        };

        Ok(Self {
            listen_addr,
            api_base_url,
            provider_timeout,
            request_timeout,
            provider_order,
            partners,
            aviasales_marker,
            cors_allow,
        })
    }

    /// Facade configuration derived from this server config.
    pub fn aggregator_config(&self) -> AggregatorConfig {
        let mut links = LinkConfig::default();
        if let Some(marker) = &self.aviasales_marker {
            links.aviasales_marker = marker.clone();
        }

        AggregatorConfig {
            api_base_url: self.api_base_url.clone(),
            provider_timeout: self.provider_timeout,
            provider_order: self.provider_order.clone(),
            partners: self.partners.clone(),
            links,
            ..AggregatorConfig::default()
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_list(name: &str) -> Vec<String> {
    env_var(name)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn env_millis(name: &str, default_ms: u64) -> Duration {
    let ms = match env_var(name) {
        None => default_ms,
        Some(raw) => match raw.parse::<u64>() {
            Ok(ms) if ms > 0 => ms,
            _ => {
                tracing::warn!("Invalid {}='{}', using {}ms", name, raw, default_ms);
                default_ms
            }
        },
    };
    Duration::from_millis(ms)
}

fn parse_partners(raw: &[String]) -> Vec<BookingPartner> {
    let mut partners: Vec<BookingPartner> = Vec::new();
    for id in raw {
        match id.parse::<BookingPartner>() {
            Ok(partner) if !partners.contains(&partner) => partners.push(partner),
            Ok(_) => {}
            Err(e) => tracing::warn!("Ignoring booking partner: {}", e),
        }
    }

    if partners.is_empty() {
        BookingPartner::ALL.to_vec()
    } else {
        partners
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_partners_skips_unknown_and_duplicates() {
        let raw = vec![
            "skyscanner".to_string(),
            "kayak".to_string(),
            "Skyscanner".to_string(),
        ];
        assert_eq!(parse_partners(&raw), vec![BookingPartner::Skyscanner]);
    }

    #[test]
    fn parse_partners_defaults_to_all() {
        assert_eq!(parse_partners(&[]), BookingPartner::ALL.to_vec());
        assert_eq!(
            parse_partners(&["kayak".to_string()]),
            BookingPartner::ALL.to_vec()
        );
    }

    #[test]
    fn aggregator_config_carries_marker() {
        let config = Config {
            aviasales_marker: Some("777".to_string()),
            provider_timeout: Duration::from_millis(1500),
            ..Config::default()
        };

        let aggregator = config.aggregator_config();
        assert_eq!(aggregator.links.aviasales_marker, "777");
        assert_eq!(aggregator.provider_timeout, Duration::from_millis(1500));
        assert_eq!(aggregator.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn from_env_reads_fs_variables() {
        std::env::set_var("FS_PROVIDER_TIMEOUT_MS", "1500");
        std::env::set_var("FS_REQUEST_TIMEOUT_MS", "not-a-number");
        std::env::set_var("FS_BOOKING_PARTNERS", "skyscanner");
        std::env::set_var("FS_PROVIDER_ORDER", "TRAVELPAYOUTS, AMADEUS");

        let config = Config::from_env().unwrap();
        assert_eq!(config.provider_timeout, Duration::from_millis(1500));
        assert_eq!(
            config.request_timeout,
            Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)
        );
        assert_eq!(config.partners, vec![BookingPartner::Skyscanner]);
        assert_eq!(config.provider_order, vec!["TRAVELPAYOUTS", "AMADEUS"]);
    }
}
