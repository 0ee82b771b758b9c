//! Tests for the standard registry
//!
//! This tests:
//! - Media and placeholder variant declarations
//! - Attribute codec round trips across every registered type
//! - Typed attribute structs against normalization

use postcraft_model::{AttrValue, Attrs};
use postcraft_schema::extensions::{
    GalleryImage, GeoPoint, ImageAttrs, PlaceholderKind, UrlMetadata, AUDIO, GALLERY, GEOLOCATION,
    IMAGE, INLINE_MATH, URL_EMBED,
};
use postcraft_schema::{ContentExpr, NodeFamily, Schema};
use serde_json::json;

fn schema() -> Schema {
    Schema::standard().unwrap()
}

#[test]
fn test_media_nodes_are_draggable_atoms() {
    let schema = schema();
    for name in [IMAGE, AUDIO, GALLERY, URL_EMBED, GEOLOCATION] {
        let spec = schema.resolve(name).unwrap();
        assert_eq!(spec.content, ContentExpr::None, "{name}");
        assert!(spec.atom, "{name}");
        assert!(spec.draggable, "{name}");
        assert!(matches!(spec.family, NodeFamily::Media(_)));
        assert!(spec.view.is_some());
    }
}

#[test]
fn test_placeholders_share_inline_content() {
    let schema = schema();
    for kind in PlaceholderKind::ALL {
        let spec = schema.resolve(kind.node_type()).unwrap();
        assert_eq!(spec.content, ContentExpr::Inline);
        assert!(spec.atom);
        assert!(spec.isolating);
        assert!(!spec.draggable);
        assert_eq!(spec.family, NodeFamily::Placeholder(kind));
        assert!(schema.resolve(kind.target_type()).is_ok());
    }
}

/// Values a codec can produce for each registered attribute
fn sample_values() -> Vec<(&'static str, &'static str, AttrValue)> {
    vec![
        (IMAGE, "src", AttrValue::from("https://cdn.example/cat.png")),
        (IMAGE, "alt", AttrValue::from("A cat & a <dog>")),
        (IMAGE, "width", AttrValue::Float(412.5)),
        (IMAGE, "align", AttrValue::from("right")),
        (IMAGE, "align", AttrValue::from("center")),
        (IMAGE, "mediaId", AttrValue::from("42")),
        (AUDIO, "duration", AttrValue::Float(183.2)),
        (AUDIO, "waveformData", AttrValue::Json(json!([0.0, 0.25, 0.9, 0.5]))),
        (
            GALLERY,
            "images",
            AttrValue::Json(json!([
                {"id": "a", "url": "https://cdn.example/a.jpg", "title": "First"},
                {"id": "b", "url": "https://cdn.example/b.jpg", "alt": "Second"}
            ])),
        ),
        (URL_EMBED, "siteName", AttrValue::from("Example")),
        (GEOLOCATION, "latitude", AttrValue::Float(-33.8688)),
        (GEOLOCATION, "zoom", AttrValue::Int(13)),
        (GEOLOCATION, "zoom", AttrValue::Int(4)),
        (INLINE_MATH, "formula", AttrValue::from("x^2")),
        (INLINE_MATH, "formula", AttrValue::from("")),
        (IMAGE, "title", AttrValue::Null),
    ]
}

#[test]
fn test_every_codec_round_trips() {
    let schema = schema();
    for (type_name, attr, value) in sample_values() {
        let spec = schema.resolve(type_name).unwrap().attr_spec(attr).unwrap();
        let rendered = spec.render(&value);
        assert_eq!(
            spec.parse(rendered.as_deref()),
            value,
            "{type_name}.{attr} via {rendered:?}"
        );
    }
}

#[test]
fn test_typed_structs_survive_normalization() {
    let schema = schema();

    let mut image = ImageAttrs::new("https://cdn.example/cat.png");
    image.width = Some(300.0);
    let normalized = schema.normalize_attrs(IMAGE, &image.to_attrs()).unwrap();
    assert_eq!(ImageAttrs::from_attrs(&normalized), image);

    let mut meta = UrlMetadata::new("https://example.com/post");
    meta.site_name = Some("Example".into());
    let normalized = schema.normalize_attrs(URL_EMBED, &meta.to_attrs()).unwrap();
    assert_eq!(UrlMetadata::from_attrs(&normalized), meta);

    let point = GeoPoint::new(51.5, -0.12);
    let normalized = schema.normalize_attrs(GEOLOCATION, &point.to_attrs()).unwrap();
    assert_eq!(normalized["zoom"], AttrValue::Int(13));
    assert_eq!(GeoPoint::from_attrs(&normalized).map(|p| p.latitude), Some(51.5));

    let images = vec![GalleryImage {
        id: "a".into(),
        url: "https://cdn.example/a.jpg".into(),
        alt: None,
        title: None,
    }];
    let normalized = schema.normalize_attrs(GALLERY, &GalleryImage::to_attrs(&images)).unwrap();
    assert_eq!(GalleryImage::from_attrs(&normalized), images);
}

#[test]
fn test_malformed_structured_attribute_normalizes_to_null() {
    let schema = schema();
    let mut attrs = Attrs::new();
    attrs.insert("images".into(), AttrValue::Json(json!({"id": "x"})));
    let normalized = schema.normalize_attrs(GALLERY, &attrs).unwrap();
    assert_eq!(normalized["images"], AttrValue::Null);
}

#[test]
fn test_commands_are_declared() {
    let commands = schema().commands();
    for name in [
        "insert_image",
        "insert_audio",
        "insert_gallery",
        "insert_url_embed",
        "insert_placeholder",
        "insert_inline_math",
    ] {
        assert!(commands.contains(&name), "{name}");
    }
}
