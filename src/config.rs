use anyhow::Context;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => postgres_url_from_parts(&get)
                .context("DATABASE_URL or POSTGRES_USER/POSTGRES_PASSWORD/POSTGRES_HOSTNAME/POSTGRES_DB must be set")?,
        };

        let secret = get("JWT_SECRET")
            .or_else(|| get("SECRET_KEY"))
            .filter(|s| !s.is_empty())
            .context("JWT_SECRET (or SECRET_KEY) must be set")?;

        let jwt = JwtConfig {
            secret,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "cookbook".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "cookbook-users".into()),
            ttl_minutes: get("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        };

        let port = match get("APP_PORT") {
            Some(p) => p.parse::<u16>().with_context(|| format!("invalid APP_PORT {p}"))?,
            None => 8080,
        };

        Ok(Self {
            database_url,
            jwt,
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
        })
    }
}

fn postgres_url_from_parts<F>(get: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let user = get("POSTGRES_USER")?;
    let password = get("POSTGRES_PASSWORD")?;
    let host = get("POSTGRES_HOSTNAME")?;
    let db = get("POSTGRES_DB").or_else(|| get("APPLICATION_DB"))?;
    let port = get("POSTGRES_PORT").unwrap_or_else(|| "5432".into());
    Some(format!("postgres://{user}:{password}@{host}:{port}/{db}"))
}
