//! Site-wide settings.
//!
//! Persisted as a single JSON document; everything above the repository works
//! with the typed struct. Unset fields fall back to the defaults documented on
//! each accessor.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

const DEFAULT_SITE_NAME: &str = "Our Company";
const DEFAULT_TAGLINE: &str = "Engineering solutions for industry";
const DEFAULT_META_DESCRIPTION: &str =
    "Divisions, products, technologies and machines of Our Company.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub site_name: Option<String>,
    pub tagline: Option<String>,
    pub vision: Option<String>,
    pub mission: Option<String>,
    pub about: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub youtube_url: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub footer_text: Option<String>,
}

impl SiteSettings {
    /// Parse the persisted JSON document. Unknown keys are ignored.
    pub fn from_json_value(value: &JsonValue) -> Result<Self, serde_json::Error> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value.clone())
    }

    /// Serialize for persistence, leaving unset fields out of the document.
    pub fn to_json_value(&self) -> JsonValue {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let JsonValue::Object(map) = &mut value {
            map.retain(|_, v| !v.is_null());
        }
        value
    }

    /// Overlay the fields present in `patch`. An empty string clears a field.
    pub fn merge(&mut self, patch: SiteSettings) {
        fn overlay(target: &mut Option<String>, value: Option<String>) {
            if let Some(v) = value {
                *target = if v.trim().is_empty() { None } else { Some(v) };
            }
        }

        overlay(&mut self.site_name, patch.site_name);
        overlay(&mut self.tagline, patch.tagline);
        overlay(&mut self.vision, patch.vision);
        overlay(&mut self.mission, patch.mission);
        overlay(&mut self.about, patch.about);
        overlay(&mut self.contact_email, patch.contact_email);
        overlay(&mut self.contact_phone, patch.contact_phone);
        overlay(&mut self.whatsapp, patch.whatsapp);
        overlay(&mut self.address, patch.address);
        overlay(&mut self.facebook_url, patch.facebook_url);
        overlay(&mut self.instagram_url, patch.instagram_url);
        overlay(&mut self.linkedin_url, patch.linkedin_url);
        overlay(&mut self.youtube_url, patch.youtube_url);
        overlay(&mut self.meta_title, patch.meta_title);
        overlay(&mut self.meta_description, patch.meta_description);
        overlay(&mut self.footer_text, patch.footer_text);
    }

    /// Defaults to "Our Company".
    pub fn site_name(&self) -> &str {
        self.site_name.as_deref().unwrap_or(DEFAULT_SITE_NAME)
    }

    /// Defaults to a generic engineering tagline.
    pub fn tagline(&self) -> &str {
        self.tagline.as_deref().unwrap_or(DEFAULT_TAGLINE)
    }

    /// Defaults to the empty string.
    pub fn vision(&self) -> &str {
        self.vision.as_deref().unwrap_or("")
    }

    /// Defaults to the empty string.
    pub fn mission(&self) -> &str {
        self.mission.as_deref().unwrap_or("")
    }

    /// Defaults to the site name.
    pub fn meta_title(&self) -> &str {
        self.meta_title.as_deref().unwrap_or_else(|| self.site_name())
    }

    /// Defaults to a description listing the site sections.
    pub fn meta_description(&self) -> &str {
        self.meta_description
            .as_deref()
            .unwrap_or(DEFAULT_META_DESCRIPTION)
    }
}
