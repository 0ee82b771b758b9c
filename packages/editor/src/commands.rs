//! # Host Commands
//!
//! Entry points the host UI binds to buttons and shortcuts. Each command
//! takes the session explicitly and reports whether it changed anything.
//! Refused insertions (selection inside an atomic node, content model
//! violation) return `false` and leave document and selection untouched.

use crate::input_rules::typing_marks;
use crate::session::EditorSession;
use postcraft_model::{attrs, AttrValue, Attrs, Node, Origin, Selection, Transaction};
use postcraft_schema::extensions::{
    inline_math, AudioAttrs, GalleryImage, ImageAttrs, PlaceholderKind, UrlMetadata, AUDIO, GALLERY,
    IMAGE, LINK, TEXT_STYLE, URL_EMBED,
};
use postcraft_schema::{ContentExpr, NodeGroup};
use tracing::debug;

/// Where a block node would be inserted for the current selection.
///
/// - inside an atomic node: nowhere
/// - node selection: directly after the selected node
/// - cursor at the start of a non-empty textblock: before that block
/// - any other position in a textblock: after that block
pub(crate) fn block_insert_position(session: &EditorSession) -> Option<usize> {
    let doc = session.doc();
    let schema = session.schema();
    let selection = session.selection();

    let rp = doc.resolve(selection.from()).ok()?;
    if (1..=rp.depth()).any(|d| schema.is_atom(&rp.node(d).type_name)) {
        debug!(pos = selection.from(), "Selection inside an atomic node");
        return None;
    }

    let content_of = |type_name: &str| schema.node_spec(type_name).map(|spec| spec.content);
    let parent = rp.parent();
    let parent_content = content_of(&parent.type_name)?;

    if let Selection::Node { to, .. } = selection {
        if accepts_blocks(parent_content) {
            return Some(to);
        }
    }

    if !parent_content.is_inline() {
        return accepts_blocks(parent_content).then_some(selection.from());
    }

    let depth = rp.depth();
    if depth == 0 {
        return None;
    }
    let container_content = content_of(&rp.node(depth - 1).type_name)?;
    if !accepts_blocks(container_content) {
        return None;
    }

    let at_start = rp.parent_offset() == 0 && parent.content_size() > 0;
    // A list item must open with its paragraph
    let first_in_item = container_content == ContentExpr::ListItemBody && rp.index(depth - 1) == 0;
    if at_start && !first_in_item {
        Some(rp.before(depth))
    } else {
        Some(rp.after(depth))
    }
}

fn accepts_blocks(content: ContentExpr) -> bool {
    matches!(content, ContentExpr::Blocks | ContentExpr::ListItemBody)
}

/// Insert a block leaf and select it
fn insert_block(session: &mut EditorSession, type_name: &str, attrs: Attrs) -> bool {
    let Some(pos) = block_insert_position(session) else {
        return false;
    };
    if session
        .schema()
        .node_spec(type_name)
        .map_or(true, |spec| spec.group != NodeGroup::Block)
    {
        return false;
    }
    let node = match session.schema().leaf(type_name, &attrs) {
        Ok(node) => node,
        Err(err) => {
            debug!(%err, type_name, "Cannot build node");
            return false;
        }
    };

    let mut tr = session.transaction();
    if tr.insert(pos, vec![node.into()]).is_err() {
        return false;
    }
    tr.set_selection(Selection::node(pos, 1))
        .set_origin(Origin::Command);
    commit(session, tr)
}

fn commit(session: &mut EditorSession, tr: Transaction) -> bool {
    match session.dispatch(tr) {
        Ok(()) => true,
        Err(err) => {
            debug!(%err, "Command failed");
            false
        }
    }
}

pub fn insert_image(session: &mut EditorSession, image: &ImageAttrs) -> bool {
    insert_block(session, IMAGE, image.to_attrs())
}

pub fn insert_audio(session: &mut EditorSession, audio: &AudioAttrs) -> bool {
    insert_block(session, AUDIO, audio.to_attrs())
}

pub fn insert_gallery(session: &mut EditorSession, images: &[GalleryImage]) -> bool {
    insert_block(session, GALLERY, GalleryImage::to_attrs(images))
}

pub fn insert_url_embed(session: &mut EditorSession, metadata: &UrlMetadata) -> bool {
    insert_block(session, URL_EMBED, metadata.to_attrs())
}

pub fn insert_placeholder(session: &mut EditorSession, kind: PlaceholderKind) -> bool {
    session.insert_placeholder(kind).is_some()
}

pub fn insert_geolocation_placeholder(session: &mut EditorSession) -> bool {
    insert_placeholder(session, PlaceholderKind::Geolocation)
}

/// Replace the selection with an inline formula
pub fn insert_inline_math(session: &mut EditorSession, formula: &str) -> bool {
    let selection = session.selection();
    let (from, to) = (selection.from(), selection.to());
    if !inline_target(session, from, to) {
        return false;
    }

    let mut tr = session.transaction();
    if tr.replace(from, to, vec![inline_math(formula).into()]).is_err() {
        return false;
    }
    tr.set_selection(Selection::cursor(from + 1))
        .set_origin(Origin::Command);
    commit(session, tr)
}

/// Whether inline atoms may replace `from..to`
fn inline_target(session: &EditorSession, from: usize, to: usize) -> bool {
    let doc = session.doc();
    let schema = session.schema();
    let (Ok(start), Ok(end)) = (doc.resolve(from), doc.resolve(to)) else {
        return false;
    };
    if !start.same_parent(&end) {
        return false;
    }
    if (1..=start.depth()).any(|d| schema.is_atom(&start.node(d).type_name)) {
        return false;
    }
    schema.node_spec(&start.parent().type_name).is_some_and(|spec| {
        spec.is_textblock() && !spec.code && spec.content == ContentExpr::Inline
    })
}

/// Type text over the selection, giving input rules the first chance
pub fn insert_text(session: &mut EditorSession, text: &str) -> bool {
    let selection = session.selection();
    let (from, to) = (selection.from(), selection.to());

    match session
        .input_rules
        .try_match(session.doc(), session.schema(), from, to, text)
    {
        Ok(Some(tr)) => return commit(session, tr),
        Ok(None) => {}
        Err(err) => {
            debug!(%err, "Input rules skipped");
            return false;
        }
    }

    let Ok(rp) = session.doc().resolve(from) else {
        return false;
    };
    let schema = session.schema();
    if (1..=rp.depth()).any(|d| schema.is_atom(&rp.node(d).type_name))
        || !schema.is_textblock(&rp.parent().type_name)
    {
        return false;
    }

    let marks = typing_marks(session.doc(), schema, from);
    let len = text.chars().count();
    let mut tr = session.transaction();
    if tr.replace(from, to, vec![Node::text(text, marks)]).is_err() {
        return false;
    }
    tr.set_selection(Selection::cursor(from + len));
    commit(session, tr)
}

/// Link the selected text
pub fn set_link(session: &mut EditorSession, href: &str, target: Option<&str>) -> bool {
    let selection = session.selection();
    if selection.is_empty() {
        return false;
    }
    let mark = match session
        .schema()
        .mark(LINK, &attrs! { "href" => href, "target" => target })
    {
        Ok(mark) => mark,
        Err(_) => return false,
    };

    let mut tr = session.transaction();
    if tr.add_mark(selection.from(), selection.to(), mark).is_err() {
        return false;
    }
    tr.set_origin(Origin::Command);
    commit(session, tr)
}

/// Remove the link from the selection, or from the whole link under the
/// cursor when nothing is selected
pub fn unset_link(session: &mut EditorSession) -> bool {
    let selection = session.selection();
    let range = if selection.is_empty() {
        crate::context::link_at(session.doc(), session.schema(), selection.from())
            .map(|link| (link.from, link.to))
    } else {
        Some((selection.from(), selection.to()))
    };
    let Some((from, to)) = range else {
        return false;
    };

    let has_link = session
        .doc()
        .text_runs()
        .iter()
        .any(|run| run.pos < to && run.end() > from && run.node.has_mark(LINK));
    if !has_link {
        return false;
    }

    let mut tr = session.transaction();
    if tr.remove_mark(from, to, LINK).is_err() {
        return false;
    }
    tr.set_origin(Origin::Command);
    commit(session, tr)
}

/// Style the selected text; clearing both attributes removes the style
pub fn set_text_style(session: &mut EditorSession, color: Option<&str>, font_size: Option<&str>) -> bool {
    let selection = session.selection();
    if selection.is_empty() {
        return false;
    }
    let (from, to) = (selection.from(), selection.to());

    let mut tr = session.transaction();
    let result = if color.is_none() && font_size.is_none() {
        tr.remove_mark(from, to, TEXT_STYLE).map(|_| ())
    } else {
        match session
            .schema()
            .mark(TEXT_STYLE, &attrs! { "color" => color, "fontSize" => font_size })
        {
            Ok(mark) if mark.attrs.values().all(AttrValue::is_null) => return false,
            Ok(mark) => tr.add_mark(from, to, mark).map(|_| ()),
            Err(_) => return false,
        }
    };
    if result.is_err() {
        return false;
    }
    tr.set_origin(Origin::Command);
    commit(session, tr)
}

pub fn undo(session: &mut EditorSession) -> bool {
    session.undo()
}

pub fn redo(session: &mut EditorSession) -> bool {
    session.redo()
}

#[cfg(test)]
mod tests {
    use super::*;
    use postcraft_model::{Document, Element, Mark};
    use postcraft_schema::extensions::{BOLD, INLINE_MATH, PARAGRAPH};
    use postcraft_schema::Schema;
    use std::sync::Arc;

    fn session(text: &str, cursor: usize) -> EditorSession {
        let schema = Arc::new(Schema::standard().unwrap());
        let doc = Document::new(vec![Element::container(
            PARAGRAPH,
            attrs! {},
            vec![Node::text(text, vec![])],
        )
        .into()]);
        let mut session = EditorSession::new(schema, doc);
        session.set_selection(Selection::cursor(cursor));
        session
    }

    #[test]
    fn test_image_goes_after_paragraph() {
        let mut session = session("hello", 3);
        assert!(insert_image(&mut session, &ImageAttrs::new("a.png")));

        let content = session.doc().content();
        assert_eq!(content.len(), 2);
        assert_eq!(content[1].type_name(), IMAGE);
        assert_eq!(session.selection(), Selection::node(7, 1));
    }

    #[test]
    fn test_image_goes_before_paragraph_at_start() {
        let mut session = session("hello", 1);
        assert!(insert_image(&mut session, &ImageAttrs::new("a.png")));
        assert_eq!(session.doc().content()[0].type_name(), IMAGE);
    }

    #[test]
    fn test_empty_paragraph_is_kept() {
        let schema = Arc::new(Schema::standard().unwrap());
        let doc = Document::new(vec![Element::container(PARAGRAPH, attrs! {}, vec![]).into()]);
        let mut session = EditorSession::new(schema, doc);
        session.set_selection(Selection::cursor(1));

        assert!(insert_image(&mut session, &ImageAttrs::new("a.png")));
        assert_eq!(session.doc().content().len(), 2);
        assert_eq!(session.doc().content()[0].type_name(), PARAGRAPH);
    }

    #[test]
    fn test_inline_math_replaces_selection() {
        let mut session = session("abcd", 1);
        session.set_selection(Selection::text(2, 4));
        assert!(insert_inline_math(&mut session, "e=mc^2"));

        let para = session.doc().content()[0].as_element().unwrap();
        assert_eq!(para.child_count(), 3);
        assert_eq!(para.children()[1].type_name(), INLINE_MATH);
        assert_eq!(session.selection(), Selection::cursor(3));
    }

    #[test]
    fn test_typing_extends_bold_but_not_link() {
        let mut session = session("ab", 3);
        let mut tr = session.transaction();
        tr.add_mark(1, 3, Mark::new(BOLD))
            .unwrap()
            .add_mark(1, 3, Mark::with_attrs(LINK, attrs! { "href" => "x" }))
            .unwrap();
        session.dispatch(tr).unwrap();

        assert!(insert_text(&mut session, "c"));
        let runs = session.doc().text_runs();
        let last = runs.last().unwrap();
        assert_eq!(last.node.text, "c");
        assert!(last.node.has_mark(BOLD));
        assert!(!last.node.has_mark(LINK));
    }

    #[test]
    fn test_link_requires_selection() {
        let mut session = session("ab", 2);
        assert!(!set_link(&mut session, "https://a.b", None));

        session.set_selection(Selection::text(1, 3));
        assert!(set_link(&mut session, "https://a.b", Some("_blank")));
        session.set_selection(Selection::cursor(2));
        assert!(unset_link(&mut session));
        assert!(!session.doc().text_runs()[0].node.has_mark(LINK));
    }

    #[test]
    fn test_text_style_set_and_cleared() {
        let mut session = session("ab", 1);
        session.set_selection(Selection::text(1, 3));
        assert!(set_text_style(&mut session, Some("#00ff00"), None));
        assert!(session.doc().text_runs()[0].node.has_mark(TEXT_STYLE));
        assert!(set_text_style(&mut session, None, None));
        assert!(!session.doc().text_runs()[0].node.has_mark(TEXT_STYLE));
    }

    #[test]
    fn test_text_style_rejects_declaration_breaking_values() {
        let mut session = session("ab", 1);
        session.set_selection(Selection::text(1, 3));
        assert!(!set_text_style(&mut session, None, Some("1px; color: blue")));
        assert!(!session.doc().text_runs()[0].node.has_mark(TEXT_STYLE));

        assert!(set_text_style(&mut session, Some("red"), Some("12px; color: blue")));
        assert_eq!(
            session.to_markup(),
            r#"<p><span style="color: red">ab</span></p>"#
        );
    }
}
