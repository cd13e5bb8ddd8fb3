use std::time::Duration;

pub const USER_AGENT: &str = concat!("skysend_bot/", env!("CARGO_PKG_VERSION"));

pub const MOJANG_API: &str = "https://api.mojang.com";
pub const HYPIXEL_API: &str = "https://api.hypixel.net/v2";

pub const CONFIG_FILE: &str = "config.json";
pub const REQUIREMENTS_FILE: &str = "reqs.json";
pub const LINKS_FILE: &str = "verified_users.json";

pub const SUCCESS_COLOR: u32 = 0x00CC66;
pub const FAILURE_COLOR: u32 = 0xFF0000;
pub const INFO_COLOR: u32 = 0x00AAFF;
pub const REPORT_COLOR: u32 = 0xAA00FF;

/// Pause between two members during a guild-wide sync.
pub const SYNC_MEMBER_DELAY: Duration = Duration::from_millis(1500);
/// How often the sync loop rechecks a disabled interval.
pub const SYNC_DISABLED_POLL: Duration = Duration::from_secs(60);
pub const ROSTER_TTL: Duration = Duration::from_secs(60);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub const REPORT_LIST_LIMIT: usize = 1000;
pub const REPORT_FIELD_LIMIT: usize = 1024;

pub const AUDIT_LOG_REASON: &str = "Hypixel guild role sync";
