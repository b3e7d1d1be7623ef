//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Babel".to_string()
}

pub fn default_data_dir() -> String {
    "~/.babel".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}

pub fn default_timeout_secs() -> u64 {
    30
}

pub fn default_custom_timeout_secs() -> u64 {
    15
}

pub fn default_max_connections() -> usize {
    10
}

pub fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

pub fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_google_base_url() -> String {
    "https://translate.googleapis.com".to_string()
}

pub fn default_min_interval_secs() -> u64 {
    3
}

pub fn default_max_retries() -> u32 {
    5
}

pub fn default_initial_retry_delay_secs() -> u64 {
    10
}

pub fn default_cooldown_secs() -> u64 {
    60
}

pub fn default_cache_ttl_secs() -> u64 {
    300
}

pub fn default_revert_delay_secs() -> u64 {
    5
}

pub fn default_cleanup_delay_secs() -> u64 {
    5
}
