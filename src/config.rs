use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// The five fitness services built from the shared template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceProfile {
    AiCoach,
    Exercise,
    Progress,
    User,
    Workout,
}

impl ServiceProfile {
    pub const ALL: [ServiceProfile; 5] = [
        ServiceProfile::AiCoach,
        ServiceProfile::Exercise,
        ServiceProfile::Progress,
        ServiceProfile::User,
        ServiceProfile::Workout,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ServiceProfile::AiCoach => "ai-coach",
            ServiceProfile::Exercise => "exercise",
            ServiceProfile::Progress => "progress",
            ServiceProfile::User => "user",
            ServiceProfile::Workout => "workout",
        }
    }

    /// Built-in configuration for this service, before any environment overrides.
    ///
    /// The ai-coach service reports the `workout-service` tag, shares the
    /// `workouts` path segment and binds to loopback only. Those values are
    /// what the deployed service answers with and are kept as-is.
    pub fn config(self) -> ServiceConfig {
        let (display_name, description, service_tag, domain, bind_host, health_route) = match self
        {
            ServiceProfile::AiCoach => (
                "AI-Coach",
                "AI-Coach service",
                "workout-service",
                "workouts",
                "localhost",
                false,
            ),
            ServiceProfile::Exercise => (
                "Exercise",
                "Exercise tracking and management service",
                "workout-service",
                "exercise",
                "0.0.0.0",
                false,
            ),
            ServiceProfile::Progress => (
                "Progress",
                "Progress tracking and management service",
                "workout-service",
                "progress",
                "0.0.0.0",
                false,
            ),
            ServiceProfile::User => (
                "User",
                "Authentication and user management service",
                "user-service",
                "users",
                "0.0.0.0",
                true,
            ),
            ServiceProfile::Workout => (
                "Workout",
                "Workout tracking and management service",
                "workout-service",
                "workouts",
                "0.0.0.0",
                false,
            ),
        };

        ServiceConfig {
            title: format!("{} Service", display_name),
            description: description.to_string(),
            version: DEFAULT_VERSION.to_string(),
            display_name: display_name.to_string(),
            service_tag: service_tag.to_string(),
            domain: domain.to_string(),
            bind_host: bind_host.to_string(),
            bind_port: DEFAULT_PORT,
            health_route,
        }
    }
}

impl fmt::Display for ServiceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ServiceProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let normalized = lower.strip_suffix("-service").unwrap_or(lower.as_str());
        match normalized {
            "ai-coach" | "ai_coach" | "aicoach" => Ok(ServiceProfile::AiCoach),
            "exercise" => Ok(ServiceProfile::Exercise),
            "progress" => Ok(ServiceProfile::Progress),
            "user" => Ok(ServiceProfile::User),
            "workout" => Ok(ServiceProfile::Workout),
            _ => bail!(
                "unknown service '{}': expected one of ai-coach, exercise, progress, user, workout",
                s
            ),
        }
    }
}

pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Immutable per-process service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub title: String,
    pub description: String,
    pub version: String,
    /// Name used in response messages, e.g. "Exercise".
    pub display_name: String,
    /// Value of the `service` field in the root response.
    pub service_tag: String,
    /// Path segment of the test route: `/api/{domain}/test`.
    pub domain: String,
    pub bind_host: String,
    pub bind_port: u16,
    /// Whether `/health` is registered.
    pub health_route: bool,
}

impl ServiceConfig {
    /// Build the configuration for `profile`, letting `SERVICE_HOST` and
    /// `SERVICE_PORT` override the bind address.
    pub fn from_env(profile: ServiceProfile) -> Result<Self> {
        let mut config = profile.config();

        if let Ok(host) = env::var("SERVICE_HOST") {
            config.bind_host = host;
        }

        if let Ok(port) = env::var("SERVICE_PORT") {
            config.bind_port = port
                .parse::<u16>()
                .context("SERVICE_PORT must be a valid port number (0-65535)")?;
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Service: {} v{}", self.title, self.version);
        tracing::info!("  Service tag: {}", self.service_tag);
        tracing::info!("  Test route: /api/{}/test", self.domain);
        tracing::info!(
            "  Health route: {}",
            if self.health_route { "enabled" } else { "disabled" }
        );
        tracing::info!("  Service listening on: {}", self.bind_address());
    }
}
