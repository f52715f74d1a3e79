use clap::Parser;

use crate::services::EventRules;
use crate::services::transitions::{Transition, TransitionTable};
use crate::validation::Paging;

#[derive(Parser, Debug, Clone)]
#[command(name = "eventhub", about = "Event listing and moderation service")]
pub struct Config {
    /// Database connection URL (in-memory store when absent)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Run database migrations on startup
    #[arg(long, env = "RUN_MIGRATIONS", default_value = "true")]
    pub run_migrations: bool,

    /// Listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// Minimum hours between now and the date of an event submitted by its owner
    #[arg(long, env = "MIN_EVENT_LEAD_HOURS", default_value = "2")]
    pub min_event_lead_hours: i64,

    /// Minimum hours between publication and the event date
    #[arg(long, env = "PUBLISH_LEAD_HOURS", default_value = "1")]
    pub publish_lead_hours: i64,

    /// Page size used when a listing request omits `size`
    #[arg(long, env = "DEFAULT_PAGE_SIZE", default_value = "10")]
    pub default_page_size: i64,

    /// Largest page size served; bigger requests are clamped
    #[arg(long, env = "MAX_PAGE_SIZE", default_value = "1000")]
    pub max_page_size: i64,

    /// Legal event state edges, written FROM:TO
    #[arg(
        long,
        env = "STATE_TRANSITIONS",
        value_delimiter = ',',
        default_value = "PENDING:PUBLISHED,PENDING:CANCELED,PUBLISHED:CANCELED"
    )]
    pub state_transitions: Vec<Transition>,
}

impl Config {
    pub fn paging(&self) -> anyhow::Result<Paging> {
        if self.default_page_size <= 0 || self.max_page_size < self.default_page_size {
            anyhow::bail!(
                "Page sizes must satisfy 0 < default ({}) <= max ({})",
                self.default_page_size,
                self.max_page_size
            );
        }
        Ok(Paging {
            default_size: self.default_page_size,
            max_size: self.max_page_size,
        })
    }

    pub fn event_rules(&self) -> anyhow::Result<EventRules> {
        let transitions =
            TransitionTable::new(&self.state_transitions).map_err(anyhow::Error::msg)?;
        Ok(EventRules {
            min_lead: lead_time("min-event-lead-hours", self.min_event_lead_hours)?,
            publish_lead: lead_time("publish-lead-hours", self.publish_lead_hours)?,
            transitions,
        })
    }
}

/// Ten years; anything longer is a misconfiguration.
const MAX_LEAD_HOURS: i64 = 24 * 365 * 10;

fn lead_time(name: &str, hours: i64) -> anyhow::Result<chrono::Duration> {
    if !(0..=MAX_LEAD_HOURS).contains(&hours) {
        anyhow::bail!("--{name} must be within 0..={MAX_LEAD_HOURS}, got {hours}");
    }
    chrono::Duration::try_hours(hours)
        .ok_or_else(|| anyhow::anyhow!("--{name} is out of range: {hours}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_to_valid_settings() {
        let config = Config::parse_from(["eventhub"]);

        let paging = config.paging().unwrap();
        assert_eq!(paging.default_size, 10);
        assert_eq!(paging.max_size, 1000);

        let rules = config.event_rules().unwrap();
        assert_eq!(rules.min_lead, chrono::Duration::hours(2));
        assert_eq!(rules.publish_lead, chrono::Duration::hours(1));
    }

    #[test]
    fn rejects_transition_out_of_canceled() {
        let config = Config::parse_from([
            "eventhub",
            "--state-transitions",
            "PENDING:PUBLISHED,CANCELED:PUBLISHED",
        ]);
        assert!(config.event_rules().is_err());
    }

    #[test]
    fn rejects_negative_and_oversized_lead_times() {
        for (flag, value) in [
            ("--min-event-lead-hours", "-1"),
            ("--publish-lead-hours", "10000000000"),
            ("--min-event-lead-hours", "9223372036854775807"),
        ] {
            let config = Config::parse_from(["eventhub", flag, value]);
            assert!(config.event_rules().is_err(), "{flag}={value}");
        }

        let config = Config::parse_from(["eventhub", "--publish-lead-hours", "87600"]);
        assert_eq!(
            config.event_rules().unwrap().publish_lead,
            chrono::Duration::hours(87600)
        );
    }

    #[test]
    fn rejects_inverted_page_sizes() {
        let config = Config::parse_from([
            "eventhub",
            "--default-page-size",
            "50",
            "--max-page-size",
            "20",
        ]);
        assert!(config.paging().is_err());
    }
}
