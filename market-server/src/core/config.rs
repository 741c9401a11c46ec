use rust_decimal::Decimal;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | CURRENCY | USD | Default order currency (ISO 4217) |
/// | DEFAULT_COMMISSION_RATE | 8.25 | Platform commission percentage |
/// | SHIPPING_FLAT_RATE | 10.00 | Flat shipping charge |
/// | FREE_SHIPPING_THRESHOLD | 100.00 | Subtotal at which shipping is waived |
/// | ESTIMATED_DELIVERY_DAYS | 7 | Default delivery estimate at dispatch |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | Graceful shutdown window |
/// | LOG_DIR | (unset) | Daily-rotated log directory; stdout only if unset |
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    /// ISO 4217 code applied when checkout omits one
    pub currency: String,
    /// Percentage applied when no seller/category override exists
    pub default_commission_rate: Decimal,
    pub shipping_flat_rate: Decimal,
    pub free_shipping_threshold: Decimal,
    pub estimated_delivery_days: i64,
    pub request_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            http_port: env_parsed("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "USD".into()),
            default_commission_rate: env_parsed("DEFAULT_COMMISSION_RATE", Decimal::new(825, 2)),
            shipping_flat_rate: env_parsed("SHIPPING_FLAT_RATE", Decimal::new(1000, 2)),
            free_shipping_threshold: env_parsed("FREE_SHIPPING_THRESHOLD", Decimal::new(10000, 2)),
            estimated_delivery_days: env_parsed("ESTIMATED_DELIVERY_DAYS", 7),
            request_timeout_ms: env_parsed("REQUEST_TIMEOUT_MS", 30_000),
            shutdown_timeout_ms: env_parsed("SHUTDOWN_TIMEOUT_MS", 10_000),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
