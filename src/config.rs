use std::env;

use chrono::{NaiveDate, Utc};

use crate::services::appointments::BookingPolicy;
use crate::services::catalog;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub admin_email: String,
    pub admin_password: String,
    pub school_name: String,
    pub catalog_start: NaiveDate,
    pub catalog_weeks: u32,
    pub booking_policy: BookingPolicy,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let catalog_start = env::var("CATALOG_START")
            .ok()
            .and_then(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d").ok())
            .unwrap_or_else(|| catalog::next_monday(Utc::now().date_naive()));

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "drivebook.db".to_string()),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@drivebook.local".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_default(),
            school_name: env::var("SCHOOL_NAME")
                .unwrap_or_else(|_| "Drivebook Driving School".to_string()),
            catalog_start,
            catalog_weeks: env::var("CATALOG_WEEKS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            booking_policy: BookingPolicy {
                reject_unknown_slot: env_flag("REJECT_UNKNOWN_SLOT", true),
                enforce_capacity: env_flag("ENFORCE_CAPACITY", true),
            },
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
