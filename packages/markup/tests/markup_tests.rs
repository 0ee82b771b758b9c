//! Load/save tests for persisted posts
//!
//! This tests:
//! - Lossless round trip of every persistable type
//! - Tolerant loading (unknown elements, malformed attributes, stray text)
//! - Placeholders never reaching the persisted form

use postcraft_markup::{parse, parse_with_report, serialize, DropReason};
use postcraft_model::{attrs, AttrValue, Document, Element, Node};
use postcraft_schema::extensions::{GALLERY, IMAGE, URL_EMBED_PLACEHOLDER};
use postcraft_schema::Schema;
use serde_json::json;

fn schema() -> Schema {
    Schema::standard().unwrap()
}

#[test]
fn test_round_trip_is_exact() {
    let markup = concat!(
        r#"<h2>Trip</h2>"#,
        r#"<p>Hello <a href="https://x.y" target="_blank">world</a> and <span style="color: #00ff00">green</span></p>"#,
        r#"<image data-src="a.png" data-align="left"/>"#,
        r#"<ul><li><p>one</p></li></ul>"#,
        r#"<pre data-language="rust">fn main() {}</pre>"#,
        r#"<ol start="3"><li><p>x</p></li></ol>"#,
        r#"<audio data-src="a.mp3" data-waveform-data="[0.1,0.8]"/>"#,
        r#"<blockquote><p>q</p></blockquote>"#,
        r#"<hr/>"#,
        r#"<p>a<br/>b<inline-math data-formula="x^2"/></p>"#,
    );
    let schema = schema();

    let (doc, report) = parse_with_report(markup, &schema).unwrap();
    assert!(report.is_clean(), "{:?}", report);
    assert_eq!(serialize(&doc, &schema), markup);
}

#[test]
fn test_document_survives_save_and_load() {
    let schema = schema();
    let gallery = Element::leaf(
        GALLERY,
        attrs! { "images" => json!([{"id": "1", "url": "https://cdn/a.jpg", "alt": "He said \"hi\""}]) },
    );
    let doc = Document::new(vec![
        Element::container("heading", attrs! { "level" => 3i64 }, vec![Node::text("T", vec![])]).into(),
        gallery.into(),
    ]);
    let doc = Document::new(
        doc.content()
            .iter()
            .map(|node| match node {
                Node::Element(el) if el.is_leaf() => Node::from(schema.leaf(&el.type_name, &el.attrs).unwrap()),
                Node::Element(el) => Node::from(
                    schema
                        .container(&el.type_name, &el.attrs, el.children().to_vec())
                        .unwrap(),
                ),
                other => other.clone(),
            })
            .collect(),
    );

    let loaded = parse(&serialize(&doc, &schema), &schema).unwrap();
    assert_eq!(loaded, doc);
}

#[test]
fn test_unknown_elements_are_dropped() {
    let schema = schema();
    let (doc, report) = parse_with_report(
        r#"<p>a<video src="x"><b>t</b></video>b</p><widget/>"#,
        &schema,
    )
    .unwrap();

    assert_eq!(serialize(&doc, &schema), "<p>ab</p>");
    let tags: Vec<&str> = report.dropped.iter().map(|d| d.tag.as_str()).collect();
    assert_eq!(tags, vec!["video", "widget"]);
    assert!(report.dropped.iter().all(|d| d.reason == DropReason::UnknownType));
}

#[test]
fn test_placeholders_do_not_load() {
    let schema = schema();
    let markup = format!("<p>x</p><{0}>https://a.b</{0}>", URL_EMBED_PLACEHOLDER);
    let doc = parse(&markup, &schema).unwrap();
    assert_eq!(doc.content().len(), 1);
}

#[test]
fn test_malformed_attributes_fall_back() {
    let schema = schema();
    let doc = parse(
        r#"<gallery data-images="[{broken"/><image data-src="a.png" data-width="wide" data-align="diagonal"/>"#,
        &schema,
    )
    .unwrap();

    let gallery = doc.content()[0].as_element().unwrap();
    assert_eq!(gallery.attr("images"), &AttrValue::Null);

    let image = doc.content()[1].as_element().unwrap();
    assert_eq!(image.type_name, IMAGE);
    assert_eq!(image.attr("width"), &AttrValue::Null);
    assert_eq!(image.attr("align"), &AttrValue::from("center"));
}

#[test]
fn test_pretty_printed_input() {
    let schema = schema();
    let doc = parse("\n  <p>one</p>\n  <p>two</p>\n", &schema).unwrap();
    assert_eq!(serialize(&doc, &schema), "<p>one</p><p>two</p>");
}

#[test]
fn test_stray_inline_content_is_wrapped() {
    let schema = schema();
    let doc = parse("hello <strong>bold</strong><p>x</p>", &schema).unwrap();
    assert_eq!(
        serialize(&doc, &schema),
        "<p>hello <strong>bold</strong></p><p>x</p>"
    );
}

#[test]
fn test_block_inside_paragraph_is_dropped() {
    let schema = schema();
    let (doc, report) = parse_with_report(r#"<p>a<image data-src="x"/></p>"#, &schema).unwrap();
    assert_eq!(serialize(&doc, &schema), "<p>a</p>");
    assert_eq!(
        report.dropped[0].reason,
        DropReason::Misplaced {
            parent: "paragraph".to_string()
        }
    );
}

#[test]
fn test_malformed_xml_is_an_error() {
    assert!(parse("<p>a<strong>b</p>", &schema()).is_err());
}

#[test]
fn test_nested_style_spans_merge() {
    let schema = schema();
    let markup = r#"<p><span style="color: red"><span style="font-size: 14px">x</span></span></p>"#;
    let doc = parse(markup, &schema).unwrap();

    let runs = doc.text_runs();
    let style = runs[0].node.mark("text-style").unwrap();
    assert_eq!(style.attr("color"), &AttrValue::from("red"));
    assert_eq!(style.attr("fontSize"), &AttrValue::from("14px"));
    assert_eq!(
        serialize(&doc, &schema),
        r#"<p><span style="color: red; font-size: 14px">x</span></p>"#
    );
}

#[test]
fn test_inner_style_wins_per_attribute() {
    let markup = r#"<p><span style="color: red; font-size: 9px">a<span style="color: blue">b</span></span></p>"#;
    let doc = parse(markup, &schema()).unwrap();

    let runs = doc.text_runs();
    assert_eq!(runs.len(), 2);
    let inner = runs[1].node.mark("text-style").unwrap();
    assert_eq!(inner.attr("color"), &AttrValue::from("blue"));
    assert_eq!(inner.attr("fontSize"), &AttrValue::from("9px"));
}
