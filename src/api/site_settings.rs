use async_graphql::{Context, InputObject, Object, Result};
use tracing::info;

use crate::{
    api::DateTimeUtc,
    database::{site_settings::format_phone_number, Database, SiteSettings},
};

pub(crate) struct SiteSettingsView(SiteSettings);

#[Object(name = "SiteSettings")]
impl SiteSettingsView {
    async fn whatsapp_number(&self) -> &str {
        &self.0.whatsapp_number
    }

    async fn email_contact(&self) -> &str {
        &self.0.email_contact
    }

    async fn phone_contact(&self) -> &str {
        &self.0.phone_contact
    }

    /// `phoneContact` as `(AA) NNNNN-NNNN`.
    async fn formatted_phone(&self) -> String {
        format_phone_number(&self.0.phone_contact)
    }

    /// Click-to-chat link with an optional prefilled message. Empty when no
    /// WhatsApp number is configured.
    async fn whatsapp_link(&self, message: Option<String>) -> String {
        self.0.whatsapp_link(message.as_deref())
    }

    async fn instagram_url(&self) -> &str {
        &self.0.instagram_url
    }

    async fn facebook_url(&self) -> &str {
        &self.0.facebook_url
    }

    async fn youtube_url(&self) -> &str {
        &self.0.youtube_url
    }

    async fn linkedin_url(&self) -> &str {
        &self.0.linkedin_url
    }

    async fn company_name(&self) -> &str {
        &self.0.company_name
    }

    async fn company_address(&self) -> &str {
        &self.0.company_address
    }

    async fn company_license(&self) -> &str {
        &self.0.company_license
    }

    async fn company_postal_code(&self) -> &str {
        &self.0.company_postal_code
    }

    async fn company_city(&self) -> &str {
        &self.0.company_city
    }

    async fn updated_at(&self) -> Option<DateTimeUtc> {
        self.0.updated_at.map(DateTimeUtc)
    }
}

#[derive(InputObject, Debug, Default)]
pub(crate) struct SiteSettingsInput {
    #[graphql(default)]
    whatsapp_number: String,
    #[graphql(default)]
    email_contact: String,
    #[graphql(default)]
    phone_contact: String,
    #[graphql(default)]
    instagram_url: String,
    #[graphql(default)]
    facebook_url: String,
    #[graphql(default)]
    youtube_url: String,
    #[graphql(default)]
    linkedin_url: String,
    #[graphql(default)]
    company_name: String,
    #[graphql(default)]
    company_address: String,
    #[graphql(default)]
    company_license: String,
    #[graphql(default)]
    company_postal_code: String,
    #[graphql(default)]
    company_city: String,
}

impl From<SiteSettingsInput> for SiteSettings {
    fn from(input: SiteSettingsInput) -> Self {
        Self {
            whatsapp_number: input.whatsapp_number,
            email_contact: input.email_contact,
            phone_contact: input.phone_contact,
            instagram_url: input.instagram_url,
            facebook_url: input.facebook_url,
            youtube_url: input.youtube_url,
            linkedin_url: input.linkedin_url,
            company_name: input.company_name,
            company_address: input.company_address,
            company_license: input.company_license,
            company_postal_code: input.company_postal_code,
            company_city: input.company_city,
            updated_at: None,
        }
    }
}

#[derive(Default)]
pub(super) struct SiteSettingsQuery;

#[Object]
impl SiteSettingsQuery {
    async fn site_settings(&self, ctx: &Context<'_>) -> Result<SiteSettingsView> {
        let db = ctx.data::<Database>()?;
        Ok(SiteSettingsView(db.site_settings()?))
    }
}

#[derive(Default)]
pub(super) struct SiteSettingsMutation;

#[Object]
impl SiteSettingsMutation {
    /// Replaces every contact and company field.
    async fn update_site_settings(
        &self,
        ctx: &Context<'_>,
        input: SiteSettingsInput,
    ) -> Result<SiteSettingsView> {
        let db = ctx.data::<Database>()?;
        let saved = db.update_site_settings(input.into())?;
        info!("Site settings updated");
        Ok(SiteSettingsView(saved))
    }
}
