//! Media node types and their typed attribute structs.

use crate::codec::{AttributeSpec, JsonShape};
use crate::error::SchemaError;
use crate::registry::SchemaBuilder;
use crate::spec::{ContentExpr, NodeFamily, NodeSpec};
use crate::view::atom_view;
use postcraft_model::{AttrValue, Attrs};
use serde::{Deserialize, Serialize};

pub const IMAGE: &str = "image";
pub const AUDIO: &str = "audio";
pub const GALLERY: &str = "gallery";
pub const URL_EMBED: &str = "url-embed";
pub const GEOLOCATION: &str = "geolocation";

pub const DEFAULT_ZOOM: i64 = 13;

const ALIGNMENTS: &[&str] = &["left", "center", "right"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Audio,
    Gallery,
    UrlEmbed,
    Geolocation,
}

impl MediaKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            MediaKind::Image => IMAGE,
            MediaKind::Audio => AUDIO,
            MediaKind::Gallery => GALLERY,
            MediaKind::UrlEmbed => URL_EMBED,
            MediaKind::Geolocation => GEOLOCATION,
        }
    }
}

pub(crate) fn register(builder: &mut SchemaBuilder) -> Result<(), SchemaError> {
    builder
        .register(
            media_node(MediaKind::Image)
                .attr(AttributeSpec::text("src"))
                .attr(AttributeSpec::text("alt"))
                .attr(AttributeSpec::text("title"))
                .attr(AttributeSpec::number("width"))
                .attr(AttributeSpec::one_of("align", ALIGNMENTS).with_default("center"))
                .attr(AttributeSpec::text("mediaId"))
                .command("insert_image"),
        )?
        .register(
            media_node(MediaKind::Audio)
                .attr(AttributeSpec::text("src"))
                .attr(AttributeSpec::text("title"))
                .attr(AttributeSpec::text("mediaId"))
                .attr(AttributeSpec::number("duration"))
                .attr(AttributeSpec::json("waveformData", JsonShape::Samples))
                .command("insert_audio"),
        )?
        .register(
            media_node(MediaKind::Gallery)
                .attr(AttributeSpec::json("images", JsonShape::GalleryImages))
                .command("insert_gallery"),
        )?
        .register(
            media_node(MediaKind::UrlEmbed)
                .attr(AttributeSpec::text("url"))
                .attr(AttributeSpec::text("title"))
                .attr(AttributeSpec::text("description"))
                .attr(AttributeSpec::text("image"))
                .attr(AttributeSpec::text("siteName"))
                .command("insert_url_embed"),
        )?
        .register(
            media_node(MediaKind::Geolocation)
                .attr(AttributeSpec::number("latitude"))
                .attr(AttributeSpec::number("longitude"))
                .attr(AttributeSpec::text("label"))
                .attr(AttributeSpec::integer("zoom").with_default(DEFAULT_ZOOM)),
        )?;
    Ok(())
}

fn media_node(kind: MediaKind) -> NodeSpec {
    NodeSpec::block(kind.type_name(), ContentExpr::None)
        .atom()
        .draggable()
        .family(NodeFamily::Media(kind))
        .view(atom_view(true))
}

fn text_attr(attrs: &Attrs, name: &str) -> Option<String> {
    attrs.get(name).and_then(AttrValue::as_str).map(str::to_string)
}

fn number_attr(attrs: &Attrs, name: &str) -> Option<f64> {
    attrs.get(name).and_then(AttrValue::as_f64)
}

fn json_attr<T: serde::de::DeserializeOwned>(attrs: &Attrs, name: &str) -> Option<T> {
    let value = attrs.get(name)?.as_json()?;
    serde_json::from_value(value.clone()).ok()
}

fn json_value<T: Serialize>(value: &T) -> AttrValue {
    serde_json::to_value(value)
        .map(AttrValue::Json)
        .unwrap_or(AttrValue::Null)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Left,
    #[default]
    Center,
    Right,
}

impl Align {
    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Align::Left),
            "center" => Some(Align::Center),
            "right" => Some(Align::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageAttrs {
    pub src: String,
    pub alt: Option<String>,
    pub title: Option<String>,
    pub width: Option<f64>,
    pub align: Align,
    pub media_id: Option<String>,
}

impl ImageAttrs {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Self::default()
        }
    }

    pub fn to_attrs(&self) -> Attrs {
        let mut attrs = Attrs::new();
        attrs.insert("src".into(), self.src.clone().into());
        attrs.insert("alt".into(), self.alt.clone().into());
        attrs.insert("title".into(), self.title.clone().into());
        attrs.insert("width".into(), self.width.into());
        attrs.insert("align".into(), self.align.as_str().into());
        attrs.insert("mediaId".into(), self.media_id.clone().into());
        attrs
    }

    pub fn from_attrs(attrs: &Attrs) -> Self {
        Self {
            src: text_attr(attrs, "src").unwrap_or_default(),
            alt: text_attr(attrs, "alt"),
            title: text_attr(attrs, "title"),
            width: number_attr(attrs, "width"),
            align: text_attr(attrs, "align")
                .and_then(|a| Align::parse(&a))
                .unwrap_or_default(),
            media_id: text_attr(attrs, "mediaId"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AudioAttrs {
    pub src: String,
    pub title: Option<String>,
    pub media_id: Option<String>,
    /// Seconds
    pub duration: Option<f64>,
    pub waveform: Option<Vec<f64>>,
}

impl AudioAttrs {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Self::default()
        }
    }

    pub fn to_attrs(&self) -> Attrs {
        let mut attrs = Attrs::new();
        attrs.insert("src".into(), self.src.clone().into());
        attrs.insert("title".into(), self.title.clone().into());
        attrs.insert("mediaId".into(), self.media_id.clone().into());
        attrs.insert("duration".into(), self.duration.into());
        let waveform = match &self.waveform {
            Some(samples) => json_value(samples),
            None => AttrValue::Null,
        };
        attrs.insert("waveformData".into(), waveform);
        attrs
    }

    pub fn from_attrs(attrs: &Attrs) -> Self {
        Self {
            src: text_attr(attrs, "src").unwrap_or_default(),
            title: text_attr(attrs, "title"),
            media_id: text_attr(attrs, "mediaId"),
            duration: number_attr(attrs, "duration"),
            waveform: json_attr(attrs, "waveformData"),
        }
    }
}

/// One entry of a gallery's `images` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl GalleryImage {
    pub fn to_attrs(images: &[GalleryImage]) -> Attrs {
        let mut attrs = Attrs::new();
        attrs.insert("images".into(), json_value(&images));
        attrs
    }

    pub fn from_attrs(attrs: &Attrs) -> Vec<GalleryImage> {
        json_attr(attrs, "images").unwrap_or_default()
    }
}

/// Entry of the host's media library, as returned by a file picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl MediaRecord {
    pub fn is_image(&self) -> bool {
        self.mime_type
            .as_deref()
            .map_or(true, |mime| mime.starts_with("image/"))
    }

    pub fn to_gallery_image(&self) -> GalleryImage {
        GalleryImage {
            id: self.id.clone(),
            url: self.url.clone(),
            alt: self.alt.clone(),
            title: self.title.clone(),
        }
    }
}

/// Metadata fetched for a URL preview card
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlMetadata {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
}

impl UrlMetadata {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn to_attrs(&self) -> Attrs {
        let mut attrs = Attrs::new();
        attrs.insert("url".into(), self.url.clone().into());
        attrs.insert("title".into(), self.title.clone().into());
        attrs.insert("description".into(), self.description.clone().into());
        attrs.insert("image".into(), self.image.clone().into());
        attrs.insert("siteName".into(), self.site_name.clone().into());
        attrs
    }

    pub fn from_attrs(attrs: &Attrs) -> Self {
        Self {
            url: text_attr(attrs, "url").unwrap_or_default(),
            title: text_attr(attrs, "title"),
            description: text_attr(attrs, "description"),
            image: text_attr(attrs, "image"),
            site_name: text_attr(attrs, "siteName"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub zoom: Option<i64>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            label: None,
            zoom: None,
        }
    }

    pub fn to_attrs(&self) -> Attrs {
        let mut attrs = Attrs::new();
        attrs.insert("latitude".into(), self.latitude.into());
        attrs.insert("longitude".into(), self.longitude.into());
        attrs.insert("label".into(), self.label.clone().into());
        attrs.insert("zoom".into(), self.zoom.unwrap_or(DEFAULT_ZOOM).into());
        attrs
    }

    pub fn from_attrs(attrs: &Attrs) -> Option<Self> {
        Some(Self {
            latitude: number_attr(attrs, "latitude")?,
            longitude: number_attr(attrs, "longitude")?,
            label: text_attr(attrs, "label"),
            zoom: attrs.get("zoom").and_then(AttrValue::as_i64),
        })
    }
}
