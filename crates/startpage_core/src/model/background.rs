//! Page background selection.
//!
//! # Responsibility
//! - Model each background mode as its own variant with only the data it
//!   needs.
//! - Map a mode to the CSS `background` value a view applies.
//! - Resolve the daily image URL from the image archive response.
//!
//! # Invariants
//! - `BackgroundMode::default()` is the daily image without a cached URL.
//! - Rendering never fails; unknown presets and missing daily images fall
//!   back to `FALLBACK_GRADIENT`.
//! - A mode accepted by `validated` reads back unchanged from storage.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rendered when no image is available for the daily background.
pub const FALLBACK_GRADIENT: &str = "linear-gradient(135deg, #0078d4 0%, #106ebe 100%)";

/// Image archive endpoint queried for the daily background.
pub const DAILY_IMAGE_ARCHIVE_URL: &str =
    "https://www.bing.com/HPImageArchive.aspx?format=js&idx=0&n=1&mkt=zh-CN";
const DAILY_IMAGE_HOST: &str = "https://www.bing.com";

/// Built-in background picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetBackground {
    pub id: &'static str,
    pub name: &'static str,
    pub url: &'static str,
}

pub const PRESET_BACKGROUNDS: &[PresetBackground] = &[
    PresetBackground {
        id: "preset1",
        name: "Background 1",
        url: "https://img-s.msn.cn/tenant/amp/entityid/BB1msG0V?w=0&h=0&q=60&m=6&f=jpg&u=t",
    },
    PresetBackground {
        id: "preset2",
        name: "Background 2",
        url: "https://img-s.msn.cn/tenant/amp/entityid/AA12rZ8k?w=0&h=0&q=60&m=6&f=jpg&u=t",
    },
    PresetBackground {
        id: "preset3",
        name: "Background 3",
        url: "https://img-s.msn.cn/tenant/amp/entityid/BB1msIAz?w=0&h=0&q=60&m=6&f=jpg&u=t",
    },
    PresetBackground {
        id: "preset4",
        name: "Background 4",
        url: "https://img-s.msn.cn/tenant/amp/entityid/BB1msDMN?w=0&h=0&q=60&m=6&f=jpg&u=t",
    },
];

pub fn preset_by_id(id: &str) -> Option<&'static PresetBackground> {
    PRESET_BACKGROUNDS.iter().find(|preset| preset.id == id)
}

/// Discriminant persisted as `backgroundType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundKind {
    DailyImage,
    Preset,
    Color,
    Image,
    Gradient,
}

impl BackgroundKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DailyImage => "bing",
            Self::Preset => "preset",
            Self::Color => "color",
            Self::Image => "image",
            Self::Gradient => "gradient",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bing" => Some(Self::DailyImage),
            "preset" => Some(Self::Preset),
            "color" => Some(Self::Color),
            "image" => Some(Self::Image),
            "gradient" => Some(Self::Gradient),
            _ => None,
        }
    }
}

impl Display for BackgroundKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the page backdrop is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundMode {
    /// Picture of the day; `cached_url` is the last resolved image.
    DailyImage { cached_url: Option<String> },
    Preset { id: String },
    Color { color: String },
    /// Uploaded picture, kept as a data URL.
    Image { data_url: String },
    Gradient { from: String, to: String },
}

impl Default for BackgroundMode {
    fn default() -> Self {
        Self::DailyImage { cached_url: None }
    }
}

impl BackgroundMode {
    pub fn kind(&self) -> BackgroundKind {
        match self {
            Self::DailyImage { .. } => BackgroundKind::DailyImage,
            Self::Preset { .. } => BackgroundKind::Preset,
            Self::Color { .. } => BackgroundKind::Color,
            Self::Image { .. } => BackgroundKind::Image,
            Self::Gradient { .. } => BackgroundKind::Gradient,
        }
    }

    /// First built-in preset, used when preset mode has no saved choice.
    pub fn first_preset() -> Self {
        Self::Preset {
            id: PRESET_BACKGROUNDS[0].id.to_string(),
        }
    }

    /// Trims variant data and rejects values that could not be restored.
    ///
    /// # Errors
    /// - `UnknownPreset` for an id outside `PRESET_BACKGROUNDS`.
    /// - `MissingColor` / `MissingImage` / `MissingGradientColor` for blank
    ///   variant data.
    pub fn validated(self) -> Result<Self, BackgroundValidationError> {
        match self {
            Self::DailyImage { cached_url } => Ok(Self::DailyImage {
                cached_url: cached_url
                    .map(|url| url.trim().to_string())
                    .filter(|url| !url.is_empty()),
            }),
            Self::Preset { id } => {
                let id = id.trim();
                match preset_by_id(id) {
                    Some(preset) => Ok(Self::Preset {
                        id: preset.id.to_string(),
                    }),
                    None => Err(BackgroundValidationError::UnknownPreset(id.to_string())),
                }
            }
            Self::Color { color } => non_blank(&color)
                .map(|color| Self::Color { color })
                .ok_or(BackgroundValidationError::MissingColor),
            Self::Image { data_url } => non_blank(&data_url)
                .map(|data_url| Self::Image { data_url })
                .ok_or(BackgroundValidationError::MissingImage),
            Self::Gradient { from, to } => match (non_blank(&from), non_blank(&to)) {
                (Some(from), Some(to)) => Ok(Self::Gradient { from, to }),
                _ => Err(BackgroundValidationError::MissingGradientColor),
            },
        }
    }

    /// CSS `background` shorthand value for this mode.
    pub fn css_value(&self) -> String {
        match self {
            Self::DailyImage {
                cached_url: Some(url),
            } => css_url(url),
            Self::DailyImage { cached_url: None } => FALLBACK_GRADIENT.to_string(),
            Self::Preset { id } => match preset_by_id(id) {
                Some(preset) => css_url(preset.url),
                None => FALLBACK_GRADIENT.to_string(),
            },
            Self::Color { color } => color.clone(),
            Self::Image { data_url } => css_url(data_url),
            Self::Gradient { from, to } => {
                format!("linear-gradient(135deg, {from} 0%, {to} 100%)")
            }
        }
    }
}

/// Rejection reasons for a background selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackgroundValidationError {
    UnknownPreset(String),
    MissingColor,
    MissingImage,
    MissingGradientColor,
}

impl Display for BackgroundValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownPreset(id) => write!(f, "unknown preset background `{id}`"),
            Self::MissingColor => write!(f, "missing background color"),
            Self::MissingImage => write!(f, "missing background image"),
            Self::MissingGradientColor => write!(f, "gradient needs two colors"),
        }
    }
}

impl Error for BackgroundValidationError {}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn css_url(url: &str) -> String {
    format!("url({url})")
}

#[derive(Deserialize)]
struct ImageArchive {
    #[serde(default)]
    images: Vec<ArchivedImage>,
}

#[derive(Deserialize)]
struct ArchivedImage {
    url: String,
}

/// Extracts the absolute daily image URL from an image archive response.
///
/// Returns `None` when the body is not JSON or lists no images.
pub fn resolve_daily_image_url(archive_body: &str) -> Option<String> {
    let archive: ImageArchive = serde_json::from_str(archive_body).ok()?;
    let image = archive.images.into_iter().next()?;
    if image.url.starts_with("http") {
        Some(image.url)
    } else {
        Some(format!("{DAILY_IMAGE_HOST}{}", image.url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_values_per_mode() {
        assert_eq!(BackgroundMode::default().css_value(), FALLBACK_GRADIENT);
        assert_eq!(
            BackgroundMode::Color {
                color: "#222222".to_string()
            }
            .css_value(),
            "#222222"
        );
        assert_eq!(
            BackgroundMode::Gradient {
                from: "#ff0000".to_string(),
                to: "#0000ff".to_string(),
            }
            .css_value(),
            "linear-gradient(135deg, #ff0000 0%, #0000ff 100%)"
        );
        assert_eq!(
            BackgroundMode::first_preset().css_value(),
            format!("url({})", PRESET_BACKGROUNDS[0].url)
        );
        assert_eq!(
            BackgroundMode::Preset {
                id: "preset99".to_string()
            }
            .css_value(),
            FALLBACK_GRADIENT
        );
    }

    #[test]
    fn validated_trims_and_rejects_unrestorable_modes() {
        assert_eq!(
            BackgroundMode::Color {
                color: " #123456 ".to_string()
            }
            .validated(),
            Ok(BackgroundMode::Color {
                color: "#123456".to_string()
            })
        );
        assert_eq!(
            BackgroundMode::Preset {
                id: "nope".to_string()
            }
            .validated(),
            Err(BackgroundValidationError::UnknownPreset("nope".to_string()))
        );
        assert_eq!(
            BackgroundMode::Color {
                color: "  ".to_string()
            }
            .validated(),
            Err(BackgroundValidationError::MissingColor)
        );
        assert_eq!(
            BackgroundMode::Image {
                data_url: String::new()
            }
            .validated(),
            Err(BackgroundValidationError::MissingImage)
        );
        assert_eq!(
            BackgroundMode::Gradient {
                from: "#000".to_string(),
                to: " ".to_string(),
            }
            .validated(),
            Err(BackgroundValidationError::MissingGradientColor)
        );
        assert_eq!(
            BackgroundMode::DailyImage {
                cached_url: Some(" ".to_string())
            }
            .validated(),
            Ok(BackgroundMode::default())
        );
    }

    #[test]
    fn kinds_use_persisted_names() {
        assert_eq!(BackgroundMode::default().kind().as_str(), "bing");
        assert_eq!(BackgroundKind::parse("gradient"), Some(BackgroundKind::Gradient));
        assert_eq!(BackgroundKind::parse("video"), None);
    }

    #[test]
    fn daily_image_url_is_made_absolute() {
        let body = r#"{"images":[{"url":"/th?id=OHR.Sample_1920x1080.jpg","copyright":"x"}]}"#;
        assert_eq!(
            resolve_daily_image_url(body).as_deref(),
            Some("https://www.bing.com/th?id=OHR.Sample_1920x1080.jpg")
        );
        assert_eq!(resolve_daily_image_url(r#"{"images":[]}"#), None);
        assert_eq!(resolve_daily_image_url("<html>"), None);
    }
}
