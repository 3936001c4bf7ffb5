use std::time::Duration;

const SEPTIC_CONFIG: &str = "SEPTIC_CONFIG";

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

pub fn get_config_path() -> String {
    std::env::var(SEPTIC_CONFIG).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

const SEPTIC_LOG: &str = "SEPTIC_LOG";

const DEFAULT_LOG_PATH: &str = "log.txt";

pub fn get_log_path() -> String {
    std::env::var(SEPTIC_LOG).unwrap_or_else(|_| DEFAULT_LOG_PATH.to_string())
}

const SEPTIC_PUBLISH_GRACE_MS: &str = "SEPTIC_PUBLISH_GRACE_MS";

const DEFAULT_PUBLISH_GRACE: Duration = Duration::from_secs(2);

/// How long binaries wait for queued alerts before disconnecting.
pub fn get_publish_grace() -> Duration {
    let grace_from_env = std::env::var(SEPTIC_PUBLISH_GRACE_MS);
    grace_from_env.map_or(DEFAULT_PUBLISH_GRACE, |res| {
        res.parse()
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_PUBLISH_GRACE)
    })
}
