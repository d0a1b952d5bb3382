//! API configuration.

use cliprank_engine::{DetectionConfig, ScoreWeights, SelectorConfig, WindowBounds};

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second
    pub rate_limit_rps: u32,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Engine tuning
    pub engine: EngineConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            max_body_size: 10 * 1024 * 1024, // 10MB
            environment: "development".to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            engine: EngineConfig::from_env(),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

/// Engine tuning exposed through the environment.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum window duration in milliseconds
    pub min_duration_ms: u64,
    /// Maximum window duration in milliseconds
    pub max_duration_ms: u64,
    /// Silence snap threshold in milliseconds
    pub snap_threshold_ms: u64,
    /// Ideal clip duration in seconds
    pub target_duration_sec: f64,
    /// Length bell width in seconds
    pub sigma_sec: f64,
    /// Windows accepted per detection run
    pub max_candidates: usize,
    /// Apply speaker-turn heuristics when turn data exists
    pub use_speaker_turns: bool,
    /// Minimum speech density gate for recommendations
    pub min_speech_density: f64,
    /// Maximum silence penalty gate for recommendations
    pub max_silence_penalty: f64,
    /// Frequency-derived boost keywords to keep
    pub keyword_pool_size: usize,
    /// Noise floor handed to the silence detector, in dB
    pub noise_db_threshold: f64,
    /// Minimum silence duration handed to the detector, in seconds
    pub min_silence_duration_sec: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: 10_000,
            max_duration_ms: 60_000,
            snap_threshold_ms: 300,
            target_duration_sec: 30.0,
            sigma_sec: 9.0,
            max_candidates: 5,
            use_speaker_turns: true,
            min_speech_density: 0.2,
            max_silence_penalty: 0.8,
            keyword_pool_size: 12,
            noise_db_threshold: -35.0,
            min_silence_duration_sec: 0.35,
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_duration_ms: env_or("ENGINE_MIN_DURATION_MS", defaults.min_duration_ms),
            max_duration_ms: env_or("ENGINE_MAX_DURATION_MS", defaults.max_duration_ms),
            snap_threshold_ms: env_or("ENGINE_SNAP_THRESHOLD_MS", defaults.snap_threshold_ms),
            target_duration_sec: env_or("ENGINE_TARGET_DURATION_SEC", defaults.target_duration_sec),
            sigma_sec: env_or("ENGINE_SIGMA_SEC", defaults.sigma_sec),
            max_candidates: env_or("ENGINE_MAX_CANDIDATES", defaults.max_candidates),
            use_speaker_turns: env_or("ENGINE_USE_SPEAKER_TURNS", defaults.use_speaker_turns),
            min_speech_density: env_or("ENGINE_MIN_SPEECH_DENSITY", defaults.min_speech_density),
            max_silence_penalty: env_or("ENGINE_MAX_SILENCE_PENALTY", defaults.max_silence_penalty),
            keyword_pool_size: env_or("ENGINE_KEYWORD_POOL_SIZE", defaults.keyword_pool_size),
            noise_db_threshold: env_or("ENGINE_NOISE_DB_THRESHOLD", defaults.noise_db_threshold),
            min_silence_duration_sec: env_or(
                "ENGINE_MIN_SILENCE_DURATION_SEC",
                defaults.min_silence_duration_sec,
            ),
        }
    }

    /// Window bounds shared by both phases.
    pub fn bounds(&self) -> WindowBounds {
        WindowBounds {
            min_ms: self.min_duration_ms,
            max_ms: self.max_duration_ms,
        }
    }

    /// Detection-phase engine configuration.
    pub fn detection(&self) -> DetectionConfig {
        DetectionConfig {
            bounds: self.bounds(),
            snap_threshold_ms: self.snap_threshold_ms,
            target_duration_sec: self.target_duration_sec,
            sigma_sec: self.sigma_sec,
            max_candidates: self.max_candidates,
            use_speaker_turns: self.use_speaker_turns,
        }
    }

    /// Recommendation-phase selector template; keywords and top-N are
    /// filled in per call.
    pub fn selector(&self) -> SelectorConfig {
        SelectorConfig {
            target_duration_sec: self.target_duration_sec,
            min_speech_density: self.min_speech_density,
            max_silence_penalty: self.max_silence_penalty,
            boost_keywords: Default::default(),
            weights: ScoreWeights::default(),
            bounds: self.bounds(),
            max_candidates: self.max_candidates,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8000);
        assert!(!config.is_production());
        assert_eq!(config.engine.max_duration_ms, 60_000);
    }

    #[test]
    fn test_engine_config_mapping() {
        let engine = EngineConfig::default();
        let detection = engine.detection();
        assert_eq!(detection.bounds.min_ms, engine.min_duration_ms);
        assert_eq!(detection.max_candidates, engine.max_candidates);

        let selector = engine.selector();
        assert_eq!(selector.bounds.max_ms, engine.max_duration_ms);
    }
}
