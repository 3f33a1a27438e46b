use std::sync::LazyLock;

use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use super::Database;

const GENERAL_KEY: &str = "general";
const WHATSAPP_BASE_URL: &str = "https://wa.me/";

static NON_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").expect("valid regex"));

/// Contact and company details shown across the public site.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub whatsapp_number: String,
    pub email_contact: String,
    pub phone_contact: String,
    pub instagram_url: String,
    pub facebook_url: String,
    pub youtube_url: String,
    pub linkedin_url: String,
    pub company_name: String,
    pub company_address: String,
    pub company_license: String,
    pub company_postal_code: String,
    pub company_city: String,
    pub updated_at: Option<DateTime<Utc>>,
}

impl SiteSettings {
    /// Click-to-chat link, or an empty string when no number is configured.
    pub fn whatsapp_link(&self, message: Option<&str>) -> String {
        if self.whatsapp_number.is_empty() {
            return String::new();
        }
        let base = format!("{WHATSAPP_BASE_URL}{}", self.whatsapp_number);
        match (message, Url::parse(&base)) {
            (Some(message), Ok(mut url)) => {
                url.query_pairs_mut().append_pair("text", message);
                url.to_string()
            }
            _ => base,
        }
    }
}

/// Formats a number stored with a two-digit country code as `(AA) NNNNN-NNNN`.
pub fn format_phone_number(phone: &str) -> String {
    if phone.is_empty() {
        return String::new();
    }
    let digits = NON_DIGIT.replace_all(phone, "");
    let part = |from: usize, to: Option<usize>| {
        let to = to.unwrap_or(digits.len()).min(digits.len());
        digits.get(from.min(to)..to).unwrap_or_default()
    };
    format!(
        "({}) {}-{}",
        part(2, Some(4)),
        part(4, Some(9)),
        part(9, None)
    )
}

impl Database {
    pub fn site_settings(&self) -> Result<SiteSettings> {
        Ok(Database::select(GENERAL_KEY, &self.settings_tree)?.unwrap_or_default())
    }

    pub fn update_site_settings(&self, mut settings: SiteSettings) -> Result<SiteSettings> {
        settings.updated_at = Some(Utc::now());
        Database::insert(GENERAL_KEY, &settings, &self.settings_tree)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_database;

    #[test]
    fn whatsapp_link_encodes_message() {
        let settings = SiteSettings {
            whatsapp_number: "5511999998888".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.whatsapp_link(None), "https://wa.me/5511999998888");
        assert_eq!(
            settings.whatsapp_link(Some("Olá, tenho interesse")),
            "https://wa.me/5511999998888?text=Ol%C3%A1%2C+tenho+interesse"
        );
        assert_eq!(SiteSettings::default().whatsapp_link(Some("hi")), "");
    }

    #[test]
    fn phone_number_formatting() {
        assert_eq!(format_phone_number("+55 (11) 99999-8888"), "(11) 99999-8888");
        assert_eq!(format_phone_number("5511999998888"), "(11) 99999-8888");
        assert_eq!(format_phone_number(""), "");
        assert_eq!(format_phone_number("55"), "() -");
    }

    #[test]
    fn settings_default_until_saved() {
        let (_dir, db) = test_database();
        assert_eq!(db.site_settings().unwrap(), SiteSettings::default());

        let saved = db
            .update_site_settings(SiteSettings {
                company_name: "Casa Nova".to_string(),
                ..Default::default()
            })
            .unwrap();
        assert!(saved.updated_at.is_some());
        assert_eq!(db.site_settings().unwrap(), saved);
    }
}
