//! Site-wide presentation settings (hero, about and footer sections).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Where the hero background image comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeroSource {
    #[default]
    LatestFeatured,
    LatestTattoo,
    MostPopular,
    SpecificTattoo,
    CustomImage,
}

/// CSS `background-size` of the hero image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundSize {
    #[default]
    Cover,
    Contain,
    Auto,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroSettings {
    pub source: HeroSource,
    pub specific_tattoo_id: Option<String>,
    pub custom_image_url: String,
    pub custom_image_public_id: String,
    pub background_size: BackgroundSize,
    pub background_position: String,
    #[validate(range(min = 0.0, max = 1.0, message = "Overlay opacity must be between 0 and 1"))]
    pub overlay_opacity: f64,
    pub title: String,
    pub subtitle: String,
}

impl Default for HeroSettings {
    fn default() -> Self {
        Self {
            source: HeroSource::LatestFeatured,
            specific_tattoo_id: None,
            custom_image_url: String::new(),
            custom_image_public_id: String::new(),
            background_size: BackgroundSize::Cover,
            background_position: "center center".to_string(),
            overlay_opacity: 0.6,
            title: "Daniela Tattoos".to_string(),
            subtitle: "Arte en tu piel. Historias que perduran para siempre.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AboutSettings {
    pub title: String,
    pub paragraph1: String,
    pub paragraph2: String,
    #[serde(rename = "stat1_value")]
    pub stat1_value: String,
    #[serde(rename = "stat1_label")]
    pub stat1_label: String,
    #[serde(rename = "stat2_value")]
    pub stat2_value: String,
    #[serde(rename = "stat2_label")]
    pub stat2_label: String,
    #[serde(rename = "stat3_value")]
    pub stat3_value: String,
    #[serde(rename = "stat3_label")]
    pub stat3_label: String,
    pub image_url: String,
    pub image_public_id: String,
    #[validate(range(min = 1900, max = 2100, message = "Experience year is out of range"))]
    pub experience_year: i64,
}

impl Default for AboutSettings {
    fn default() -> Self {
        Self {
            title: "Arte que Cuenta Historias".to_string(),
            paragraph1: "Con más de 10 años de experiencia...".to_string(),
            paragraph2: "Mi compromiso es brindarte una experiencia excepcional...".to_string(),
            stat1_value: "500+".to_string(),
            stat1_label: "Tatuajes".to_string(),
            stat2_value: "10+".to_string(),
            stat2_label: "Años".to_string(),
            stat3_value: "100%".to_string(),
            stat3_label: "Satisfacción".to_string(),
            image_url: "/daniela.jpg".to_string(),
            image_public_id: String::new(),
            experience_year: 2014,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct FooterSettings {
    pub contact_title: String,
    pub contact_subtitle: String,
    pub title: String,
    pub tagline: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub instagram: String,
    pub whatsapp: String,
    pub facebook: String,
    pub twitter: String,
    pub copyright: String,
}

impl Default for FooterSettings {
    fn default() -> Self {
        Self {
            contact_title: "Hagamos Realidad tu Tatuaje".to_string(),
            contact_subtitle: "¿Tienes una idea en mente? Hablemos sobre tu próximo tatuaje y creemos algo único juntos.".to_string(),
            title: "Daniela Tattoos".to_string(),
            tagline: "Arte que perdura para siempre".to_string(),
            address: "Calle Principal 123, Ciudad".to_string(),
            phone: "+1 234 567 890".to_string(),
            email: "contacto@danielatattoos.com".to_string(),
            instagram: "https://instagram.com/danielatattoos".to_string(),
            whatsapp: "https://wa.me/1234567890".to_string(),
            facebook: String::new(),
            twitter: String::new(),
            copyright: "Todos los derechos reservados".to_string(),
        }
    }
}

/// The singleton settings record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[validate(nested)]
    pub hero: HeroSettings,
    #[validate(nested)]
    pub about: AboutSettings,
    #[validate(nested)]
    pub footer: FooterSettings,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial settings sent by the admin panel. Each section is merged key by key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    #[serde(default)]
    pub hero: Option<Value>,
    #[serde(default)]
    pub about: Option<Value>,
    #[serde(default)]
    pub footer: Option<Value>,
}

impl Settings {
    /// Merge a patch into the current sections.
    ///
    /// Keys present in the patch overwrite stored values; other keys are kept. The
    /// result is not validated here.
    pub fn apply_patch(&mut self, patch: SettingsPatch) -> Result<(), serde_json::Error> {
        if let Some(hero) = patch.hero {
            self.hero = merge_section(&self.hero, hero)?;
        }
        if let Some(about) = patch.about {
            self.about = merge_section(&self.about, about)?;
        }
        if let Some(footer) = patch.footer {
            self.footer = merge_section(&self.footer, footer)?;
        }
        Ok(())
    }
}

fn merge_section<T>(current: &T, patch: Value) -> Result<T, serde_json::Error>
where
    T: Serialize + serde::de::DeserializeOwned,
{
    let mut merged = serde_json::to_value(current)?;
    if let (Value::Object(target), Value::Object(changes)) = (&mut merged, patch) {
        for (key, value) in changes {
            target.insert(key, value);
        }
    }
    serde_json::from_value(merged)
}
