//! Process configuration, loaded once from the environment (plus any
//! `.env` file dotenvy picks up) and cached for the life of the process.

use std::collections::HashMap;
use std::sync::LazyLock;

use thiserror::Error;
use tokio::sync::OnceCell;

static ENV_VARS: LazyLock<OnceCell<Env>> = LazyLock::new(OnceCell::new);

pub async fn get_var(var: Var) -> EnvResult<&'static str> {
    let vars = ENV_VARS.get_or_try_init(|| async { Env::new() }).await?;
    Ok(match var {
        Var::DatabaseUrl => &vars.database_url,
        Var::AuthBaseUrl => &vars.auth_base_url,
        Var::ServerApiPort => &vars.server_api_port,
        Var::CorsAllowOrigins => &vars.cors_allow_origins,
        Var::OtelExporterEndpoint => &vars.otel_exporter_otlp_endpoint,
        Var::ApiServiceName => &vars.api_service_name,
        Var::ApiTracerName => &vars.api_tracer_name,
    })
}

#[derive(Debug, Clone)]
pub struct Env {
    pub database_url: String,
    pub auth_base_url: String,
    pub server_api_port: String,
    pub cors_allow_origins: String,
    pub otel_exporter_otlp_endpoint: String,
    pub api_service_name: String,
    pub api_tracer_name: String,
}

impl Env {
    pub fn new() -> EnvResult<Self> {
        // a missing .env file is fine, any other load failure is not
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(EnvErr::Dotenvy(e));
            }
        }

        Self::from_iter(std::env::vars())
    }

    fn from_iter<I>(iter: I) -> EnvResult<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars: HashMap<String, String> = iter.into_iter().collect();

        Ok(Self {
            database_url: required(&mut vars, "DATABASE_URL")?,
            auth_base_url: required(&mut vars, "AUTH_BASE_URL")?,
            server_api_port: optional(&mut vars, "SERVER_API_PORT", "3001"),
            cors_allow_origins: optional(&mut vars, "CORS_ALLOW_ORIGINS", "*"),
            otel_exporter_otlp_endpoint: required(&mut vars, "OTEL_EXPORTER_OTLP_ENDPOINT")?,
            api_service_name: optional(&mut vars, "API_SERVICE_NAME", "medialog-server"),
            api_tracer_name: optional(&mut vars, "API_TRACER_NAME", "medialog-api"),
        })
    }
}

fn required(vars: &mut HashMap<String, String>, key: &str) -> EnvResult<String> {
    vars.remove(key)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EnvErr::MissingValue(key.to_owned()))
}

fn optional(vars: &mut HashMap<String, String>, key: &str, default: &str) -> String {
    vars.remove(key)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

#[derive(Debug)]
pub enum Var {
    DatabaseUrl,
    AuthBaseUrl,
    ServerApiPort,
    CorsAllowOrigins,
    OtelExporterEndpoint,
    ApiServiceName,
    ApiTracerName,
}

#[macro_export]
macro_rules! var {
    ($ev:expr) => {
        $crate::util::env::get_var($ev)
    };
}

pub type EnvResult<T> = core::result::Result<T, EnvErr>;

#[derive(Debug, Error)]
pub enum EnvErr {
    #[error(transparent)]
    Dotenvy(#[from] dotenvy::Error),

    #[error("missing required environment variable '{0}'")]
    MissingValue(String),
}
