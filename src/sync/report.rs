use super::{member::SyncOutcome, promotion_hint, voidling_candidate};
use crate::constants::{REPORT_COLOR, REPORT_FIELD_LIMIT, REPORT_LIST_LIMIT};
use poise::serenity_prelude::CreateEmbed;

/// Outcome buckets of a guild-wide sync.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub synced: Vec<String>,
    pub voidling_eligible: Vec<String>,
    pub bypassed: Vec<String>,
    pub unverified: Vec<String>,
    pub failed: Vec<String>,
    pub manual: Vec<String>,
}

impl SyncReport {
    pub fn record(&mut self, display_name: &str, outcome: &SyncOutcome) {
        self.synced.push(display_name.to_owned());
        let SyncOutcome::Member { tier, rank, level } = outcome else {
            return;
        };
        if voidling_candidate(rank, *tier) {
            self.voidling_eligible
                .push(format!("{display_name} (Lv {})", level.round()));
        }
        if let Some(promotion) = promotion_hint(rank, *tier) {
            self.manual.push(format!("**{display_name}**: {promotion}"));
        }
    }

    pub fn fields(&self) -> [(&'static str, String); 6] {
        [
            ("✅ Successful Sync", join_limited(&self.synced)),
            ("✨ Voidling Eligible", join_limited(&self.voidling_eligible)),
            ("⏭️ Bypassed", join_limited(&self.bypassed)),
            ("❓ Unverified", join_limited(&self.unverified)),
            ("❌ Failed", join_limited(&self.failed)),
            (
                "⚠️ Manual Promotions Needed",
                truncate_chars(&self.manual.join("\n"), REPORT_FIELD_LIMIT),
            ),
        ]
    }

    pub fn embed(&self) -> CreateEmbed {
        CreateEmbed::new()
            .title("Global Sync Report")
            .color(REPORT_COLOR)
            .fields(
                self.fields()
                    .into_iter()
                    .map(|(name, value)| (name, value, false)),
            )
    }
}

/// Comma-joins a bucket, cutting it to fit an embed field.
pub fn join_limited(items: &[String]) -> String {
    let joined = items.join(", ");
    if joined.is_empty() {
        return String::from("None");
    }
    if joined.chars().count() > REPORT_LIST_LIMIT {
        let mut cut = joined
            .chars()
            .take(REPORT_LIST_LIMIT - 3)
            .collect::<String>();
        cut.push_str("...");
        cut
    } else {
        joined
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.is_empty() {
        String::from("None")
    } else {
        text.chars().take(limit).collect()
    }
}
