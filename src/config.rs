use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Argon2 cost factors. `None` keeps the crate defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PasswordConfig {
    pub m_cost: Option<u32>,
    pub t_cost: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    pub api_key: String,
    pub base_url: String,
    pub country: String,
    pub units: String,
    pub sun_api_url: String,
    pub timeout_secs: u64,
    pub max_in_flight: usize,
}

impl WeatherConfig {
    pub fn current_url(&self) -> String {
        format!("{}/weather", self.base_url.trim_end_matches('/'))
    }

    pub fn forecast_url(&self) -> String {
        format!("{}/forecast", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub weather: WeatherConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: env_or("JWT_ISSUER", "skyledger"),
            audience: env_or("JWT_AUDIENCE", "skyledger-users"),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
        };
        let password = PasswordConfig {
            m_cost: env_parse("PASSWORD_M_COST"),
            t_cost: env_parse("PASSWORD_T_COST"),
        };
        let weather = WeatherConfig {
            api_key: std::env::var("OPENWEATHER_API_KEY")?,
            base_url: env_or("OPENWEATHER_BASE_URL", "https://api.openweathermap.org/data/2.5"),
            country: env_or("WEATHER_COUNTRY", "US"),
            units: env_or("WEATHER_UNITS", "imperial"),
            sun_api_url: env_or("SUN_API_URL", "https://api.sunrise-sunset.org/json"),
            timeout_secs: env_parse("UPSTREAM_TIMEOUT_SECS").unwrap_or(5),
            max_in_flight: env_parse("UPSTREAM_MAX_IN_FLIGHT").unwrap_or(16),
        };
        Ok(Self {
            database_url,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS").unwrap_or(10),
            jwt,
            password,
            weather,
        })
    }
}
