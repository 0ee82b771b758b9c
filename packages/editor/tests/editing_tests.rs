//! End-to-end editing through the session
//!
//! This tests:
//! - Typed `$$…$$` becoming inline math, and not re-triggering
//! - Link/color correction folded into the triggering undo step
//! - Context menu resolution over links
//! - Media insertion and refusal in atomic contexts

use postcraft_editor::{
    commands, link_color_violations, resolve_context_menu, ContextMenu, Coords, EditorConfig,
    EditorSession,
};
use postcraft_model::{Node, Selection};
use postcraft_schema::extensions::{AudioAttrs, ImageAttrs, UrlMetadata, AUDIO, IMAGE, INLINE_MATH};
use postcraft_schema::Schema;
use std::sync::Arc;

fn load(markup: &str) -> EditorSession {
    let schema = Arc::new(Schema::standard().unwrap());
    EditorSession::from_markup(schema, markup, EditorConfig::default()).unwrap()
}

fn type_text(session: &mut EditorSession, text: &str) {
    for ch in text.chars() {
        assert!(commands::insert_text(session, &ch.to_string()));
    }
}

fn count_math(session: &EditorSession) -> usize {
    let mut count = 0;
    session.doc().descendants(|node, _| {
        if node.type_name() == INLINE_MATH {
            count += 1;
        }
        true
    });
    count
}

#[test]
fn test_typed_formula_becomes_inline_math() {
    let mut session = load("<p></p>");
    session.set_selection(Selection::cursor(1));

    type_text(&mut session, "$$x^2$$");
    assert_eq!(
        session.to_markup(),
        r#"<p><inline-math data-formula="x^2"/></p>"#
    );
    assert_eq!(session.selection(), Selection::cursor(2));

    // Later input does not fire again
    type_text(&mut session, " then $$");
    assert_eq!(count_math(&session), 1);
    assert_eq!(session.doc().text_content(), " then $$");
}

#[test]
fn test_formula_rule_is_one_undo_step() {
    let mut session = load("<p></p>");
    session.set_selection(Selection::cursor(1));
    type_text(&mut session, "$$x^2$$");

    assert!(session.undo());
    assert_eq!(session.doc().text_content(), "$$x^2$");
    assert_eq!(count_math(&session), 0);
}

#[test]
fn test_no_formula_in_code_block() {
    let mut session = load("<pre>x</pre>");
    session.set_selection(Selection::cursor(2));
    type_text(&mut session, "$$a$$");
    assert_eq!(session.to_markup(), "<pre>x$$a$$</pre>");
}

#[test]
fn test_input_rules_can_be_disabled() {
    let schema = Arc::new(Schema::standard().unwrap());
    let config = EditorConfig {
        input_rules: false,
        ..EditorConfig::default()
    };
    let mut session = EditorSession::from_markup(schema, "<p></p>", config).unwrap();
    session.set_selection(Selection::cursor(1));
    type_text(&mut session, "$$y$$");
    assert_eq!(count_math(&session), 0);
}

#[test]
fn test_link_clears_color_keeps_size() {
    let mut session = load("<p>hello</p>");
    session.set_selection(Selection::text(1, 6));

    assert!(commands::set_text_style(&mut session, Some("#ff0000"), Some("14px")));
    assert!(commands::set_link(&mut session, "https://a.b", None));

    assert_eq!(
        session.to_markup(),
        r#"<p><a href="https://a.b"><span style="font-size: 14px">hello</span></a></p>"#
    );
    assert!(link_color_violations(session.doc()).is_empty());

    // Correction shares the undo step of the link
    assert_eq!(session.history().undo_levels(), 2);
    assert!(session.undo());
    assert_eq!(
        session.to_markup(),
        r#"<p><span style="color: #ff0000; font-size: 14px">hello</span></p>"#
    );
}

#[test]
fn test_color_only_style_is_removed_under_link() {
    let mut session = load(r#"<p><a href="https://a.b">hello</a></p>"#);
    session.set_selection(Selection::text(1, 6));

    assert!(commands::set_text_style(&mut session, Some("#ff0000"), None));
    assert_eq!(session.to_markup(), r#"<p><a href="https://a.b">hello</a></p>"#);
}

#[test]
fn test_loaded_violations_are_fixed_on_demand() {
    let mut session = load(r#"<p><a href="x"><span style="color: red">t</span></a></p>"#);
    assert_eq!(link_color_violations(session.doc()).len(), 1);

    assert!(session.enforce_invariants().unwrap());
    assert_eq!(session.to_markup(), r#"<p><a href="x">t</a></p>"#);
    assert!(!session.can_undo());
    assert!(!session.enforce_invariants().unwrap());
}

#[test]
fn test_context_menu_over_link() {
    let mut session = load(r#"<p>see <a href="https://a.b">docs</a></p>"#);
    let lookup = |coords: Coords| -> Option<usize> {
        if coords.x > 50.0 {
            Some(6)
        } else {
            Some(2)
        }
    };

    let menu = resolve_context_menu(&session, &lookup, Coords::new(80.0, 12.0));
    let ContextMenu::Link(target) = menu else {
        panic!("expected link menu");
    };
    assert_eq!(target.href, "https://a.b");
    assert_eq!(target.pos, 6);
    assert_eq!(target.coords, Coords::new(80.0, 12.0));
    assert_eq!((target.from, target.to), (5, 9));

    let elsewhere = resolve_context_menu(&session, &lookup, Coords::new(10.0, 12.0));
    assert!(!elsewhere.suppresses_default());

    // Remove the link from the menu
    session.set_selection(Selection::cursor(target.pos));
    assert!(commands::unset_link(&mut session));
    assert_eq!(session.to_markup(), "<p>see docs</p>");
}

#[test]
fn test_media_insertion_sequence() {
    let mut session = load("<p>intro</p>");
    session.set_selection(Selection::cursor(6));

    let mut image = ImageAttrs::new("cover.png");
    image.alt = Some("Cover".to_string());
    assert!(commands::insert_image(&mut session, &image));
    assert_eq!(session.selection(), Selection::node(7, 1));

    // Node selection: the next block goes right after the image
    assert!(commands::insert_audio(&mut session, &AudioAttrs::new("talk.mp3")));
    let types: Vec<&str> = session.doc().content().iter().map(Node::type_name).collect();
    assert_eq!(types, vec!["paragraph", IMAGE, AUDIO]);

    // Inline math needs a textblock
    assert!(!commands::insert_inline_math(&mut session, "x"));

    assert!(commands::insert_url_embed(&mut session, &UrlMetadata::new("https://a.b")));
    assert_eq!(
        session.to_markup(),
        concat!(
            "<p>intro</p>",
            r#"<image data-src="cover.png" data-alt="Cover"/>"#,
            r#"<audio data-src="talk.mp3"/>"#,
            r#"<url-embed data-url="https://a.b"/>"#,
        )
    );

    assert!(commands::undo(&mut session));
    assert!(commands::redo(&mut session));
    assert_eq!(session.doc().content().len(), 4);
}
