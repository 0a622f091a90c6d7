//! Helpers over the `markup5ever_rcdom` tree.
//!
//! The copy pipeline works on an owned HTML tree rather than a browser DOM.
//! These functions cover the handful of DOM operations it needs: building
//! nodes, cloning, reading text, editing inline styles, selector lookup,
//! parsing and serialization.

use crate::common::chars::{PARAGRAPH_TAG, SPAN_TAG, STYLE_ATTRIBUTE};
use crate::error::CopyError;
use crate::style::css::{parse_declaration_list, Declaration};
use crate::style::selector::SelectorGroup;
use html5ever::serialize::{SerializeOpts, TraversalScope};
use html5ever::tendril::TendrilSink;
use html5ever::{ns, parse_document, serialize, Attribute, LocalName, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Create an HTML element with the given attributes.
pub fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.into()),
        },
    })
}

/// Create a comment node
pub fn create_comment(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Comment {
            contents: text.into(),
        },
    })
}

/// Create a `<span>` holding a single text node.
pub fn create_span_with_text(text: &str) -> Handle {
    let span = create_element(SPAN_TAG, Vec::new());
    append_child(&span, create_text(text));
    span
}

pub fn create_paragraph() -> Handle {
    create_element(PARAGRAPH_TAG, Vec::new())
}

/// Append `child` to `parent`, updating the child's parent link.
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Snapshot of a node's children.
pub fn children(node: &Handle) -> Vec<Handle> {
    node.children.borrow().clone()
}

/// Detach every child of `node`.
pub fn remove_children(node: &Handle) {
    for child in node.children.borrow_mut().drain(..) {
        child.parent.set(None);
    }
}

/// The parent of `node`, whatever its kind.
pub fn parent_node(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

/// The parent of `node`, if it is an element.
pub fn parent_element(node: &Handle) -> Option<Handle> {
    parent_node(node).filter(is_element)
}

pub fn is_element(node: &Handle) -> bool {
    matches!(node.data, NodeData::Element { .. })
}

pub fn is_text(node: &Handle) -> bool {
    matches!(node.data, NodeData::Text { .. })
}

/// Lower-case local name of an element.
pub fn tag_name(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Element { name, .. } => Some((*name.local).to_ascii_lowercase()),
        _ => None,
    }
}

pub fn is_tag(node: &Handle, tag: &str) -> bool {
    match &node.data {
        NodeData::Element { name, .. } => (*name.local).eq_ignore_ascii_case(tag),
        _ => false,
    }
}

pub fn get_attribute(node: &Handle, attr: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| (*a.name.local).eq_ignore_ascii_case(attr))
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Set or replace an attribute. Does nothing on non-element nodes.
pub fn set_attribute(node: &Handle, attr: &str, value: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let mut attrs = attrs.borrow_mut();
        match attrs
            .iter_mut()
            .find(|a| (*a.name.local).eq_ignore_ascii_case(attr))
        {
            Some(existing) => existing.value = value.to_string().into(),
            None => attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(attr)),
                value: value.to_string().into(),
            }),
        }
    }
}

/// Drop every attribute other than `style`.
pub fn remove_all_attributes_except_style(node: &Handle) {
    if let NodeData::Element { attrs, .. } = &node.data {
        attrs
            .borrow_mut()
            .retain(|a| (*a.name.local).eq_ignore_ascii_case(STYLE_ATTRIBUTE));
    }
}

pub fn class_list(node: &Handle) -> Vec<String> {
    get_attribute(node, "class")
        .map(|classes| classes.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Inline declarations of an element, in source order.
pub fn inline_declarations(node: &Handle) -> Vec<Declaration> {
    get_attribute(node, STYLE_ATTRIBUTE)
        .map(|style| parse_declaration_list(&style))
        .unwrap_or_default()
}

/// Value of one inline style property. An `!important` declaration beats a
/// normal one, otherwise the last declaration wins.
pub fn inline_style_value(node: &Handle, property: &str) -> Option<String> {
    inline_declarations(node)
        .into_iter()
        .enumerate()
        .filter(|(_, declaration)| declaration.name == property)
        .max_by_key(|(index, declaration)| (declaration.important, *index))
        .map(|(_, declaration)| declaration.value)
}

/// Set one inline style property, replacing an existing declaration for it.
///
/// The attribute is rewritten in the `property: value;` form browsers use
/// when a style is set through the CSSOM, and the replaced declaration loses
/// any `!important` flag.
pub fn set_style_property(node: &Handle, property: &str, value: &str) {
    if !is_element(node) {
        return;
    }
    let replacement = Declaration::new(property, value);
    let mut declarations = Vec::new();
    let mut replaced = false;
    for declaration in inline_declarations(node) {
        if declaration.name != replacement.name {
            declarations.push(declaration);
        } else if !replaced {
            declarations.push(replacement.clone());
            replaced = true;
        }
    }
    if !replaced {
        declarations.push(replacement);
    }
    let style = declarations
        .iter()
        .map(Declaration::to_css)
        .collect::<Vec<_>>()
        .join(" ");
    set_attribute(node, STYLE_ATTRIBUTE, &style);
}

/// Append a raw declaration to the `style` attribute, inserting a `;`
/// separator when the existing value does not end with one.
pub fn append_inline_style(node: &Handle, style: &str) {
    if !is_element(node) {
        return;
    }
    let existing = get_attribute(node, STYLE_ATTRIBUTE).unwrap_or_default();
    let combined = if existing.trim().is_empty() {
        style.to_string()
    } else if existing.trim_end().ends_with(';') {
        format!("{existing}{style}")
    } else {
        format!("{existing};{style}")
    };
    set_attribute(node, STYLE_ATTRIBUTE, &combined);
}

/// Concatenated text of all descendant text nodes.
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    match &node.data {
        NodeData::Text { contents } => out.push_str(&contents.borrow()),
        NodeData::Comment { .. } | NodeData::ProcessingInstruction { .. } => {}
        _ => {
            for child in node.children.borrow().iter() {
                collect_text(child, out);
            }
        }
    }
}

/// Text of a text node, `None` for anything else.
pub fn node_text(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// Recursive copy of `node` and its subtree. The copy has no parent.
pub fn deep_clone(node: &Handle) -> Handle {
    let data = match &node.data {
        NodeData::Document => NodeData::Document,
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => NodeData::Doctype {
            name: name.clone(),
            public_id: public_id.clone(),
            system_id: system_id.clone(),
        },
        NodeData::Text { contents } => NodeData::Text {
            contents: RefCell::new(contents.borrow().clone()),
        },
        NodeData::Comment { contents } => NodeData::Comment {
            contents: contents.clone(),
        },
        NodeData::Element {
            name,
            attrs,
            mathml_annotation_xml_integration_point,
            ..
        } => NodeData::Element {
            name: name.clone(),
            attrs: RefCell::new(attrs.borrow().clone()),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: *mathml_annotation_xml_integration_point,
        },
        NodeData::ProcessingInstruction { target, contents } => {
            NodeData::ProcessingInstruction {
                target: target.clone(),
                contents: contents.clone(),
            }
        }
    };
    let copy = Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data,
    });
    for child in node.children.borrow().iter() {
        append_child(&copy, deep_clone(child));
    }
    copy
}

/// Parse a complete HTML document.
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), ParseOpts::default()).one(html)
}

/// The `<body>` element of a parsed document.
pub fn body(dom: &RcDom) -> Option<Handle> {
    find_first(&dom.document, &|node| is_tag(node, "body"))
}

/// Parse an HTML fragment and return its top-level nodes, detached.
pub fn parse_fragment(html: &str) -> Vec<Handle> {
    let dom = parse_html(&format!("<!DOCTYPE html><html><head></head><body>{html}</body></html>"));
    let Some(body) = body(&dom) else {
        return Vec::new();
    };
    let nodes = children(&body);
    remove_children(&body);
    nodes
}

/// Depth-first search including `root` itself.
pub fn find_first(root: &Handle, predicate: &dyn Fn(&Handle) -> bool) -> Option<Handle> {
    if predicate(root) {
        return Some(root.clone());
    }
    root.children
        .borrow()
        .iter()
        .find_map(|child| find_first(child, predicate))
}

/// First element under `root` matching a CSS selector list such as
/// `pre#highlighted-code-wrapper`. An unparseable selector matches nothing.
pub fn query_selector(root: &Handle, selector: &str) -> Option<Handle> {
    let group = SelectorGroup::parse(selector)?;
    find_first(root, &|node| group.matches(node))
}

/// Serialize `node` including its own tags (`outerHTML`).
pub fn serialize_node(node: &Handle) -> Result<String, CopyError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    let serializable = SerializableHandle::from(node.clone());
    serialize(&mut output, &serializable, opts)
        .map_err(|e| CopyError::Serialization(format!("HTML serialization failed: {e}")))?;

    String::from_utf8(output)
        .map_err(|e| CopyError::Serialization(format!("UTF-8 conversion failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_inline_style_adds_separator() {
        let span = create_element("span", vec![("style", "font-size: 14px")]);
        append_inline_style(&span, "color: red;");
        assert_eq!(
            get_attribute(&span, "style").as_deref(),
            Some("font-size: 14px;color: red;")
        );
    }

    #[test]
    fn test_append_inline_style_keeps_existing_separator() {
        let span = create_element("span", vec![("style", "color: blue;")]);
        append_inline_style(&span, "margin:0cm;");
        assert_eq!(
            get_attribute(&span, "style").as_deref(),
            Some("color: blue;margin:0cm;")
        );
    }

    #[test]
    fn test_append_inline_style_on_empty() {
        let span = create_element("span", vec![]);
        append_inline_style(&span, "mso-spacerun:yes");
        assert_eq!(
            get_attribute(&span, "style").as_deref(),
            Some("mso-spacerun:yes")
        );
    }

    #[test]
    fn test_set_style_property_replaces() {
        let span = create_element("span", vec![("style", "color: red; font-style: italic;")]);
        set_style_property(&span, "color", "rgb(0, 0, 255)");
        assert_eq!(
            get_attribute(&span, "style").as_deref(),
            Some("color: rgb(0, 0, 255); font-style: italic;")
        );
        assert_eq!(inline_style_value(&span, "font-style").as_deref(), Some("italic"));
    }

    #[test]
    fn test_set_style_property_drops_importance_of_replaced() {
        let span = create_element(
            "span",
            vec![("style", "font-family: \"A;B\", monospace; color: red !important")],
        );
        set_style_property(&span, "color", "blue");
        assert_eq!(
            get_attribute(&span, "style").as_deref(),
            Some("font-family: \"A;B\", monospace; color: blue;")
        );
    }

    #[test]
    fn test_inline_style_value_prefers_important() {
        let span = create_element(
            "span",
            vec![("style", "color: red !important; color: blue")],
        );
        assert_eq!(inline_style_value(&span, "color").as_deref(), Some("red"));
    }

    #[test]
    fn test_remove_all_attributes_except_style() {
        let el = create_element(
            "pre",
            vec![("id", "x"), ("class", "code"), ("style", "color: red;")],
        );
        remove_all_attributes_except_style(&el);
        assert_eq!(get_attribute(&el, "id"), None);
        assert_eq!(get_attribute(&el, "class"), None);
        assert_eq!(get_attribute(&el, "style").as_deref(), Some("color: red;"));
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let root = create_element("div", vec![("class", "a")]);
        let span = create_span_with_text("hello");
        append_child(&root, span);
        append_child(&root, create_comment("note"));

        let copy = deep_clone(&root);
        set_attribute(&copy, "class", "b");
        remove_children(&copy);

        assert_eq!(get_attribute(&root, "class").as_deref(), Some("a"));
        assert_eq!(children(&root).len(), 2);
        assert_eq!(text_content(&root), "hello");
    }

    #[test]
    fn test_parent_element() {
        let root = create_element("span", vec![]);
        let text = create_text("x");
        append_child(&root, text.clone());
        let parent = parent_element(&text).expect("parent");
        assert!(Rc::ptr_eq(&parent, &root));
        // reading the parent must not clear the link
        assert!(parent_element(&text).is_some());
    }

    #[test]
    fn test_query_selector() {
        let dom = parse_html(
            "<div><pre id=\"wrapper\" class=\"code\"><code class=\"hl main\">x</code></pre></div>",
        );
        let pre = query_selector(&dom.document, "pre#wrapper").expect("pre");
        assert!(is_tag(&pre, "pre"));
        assert!(query_selector(&dom.document, "code.hl.main").is_some());
        assert!(query_selector(&dom.document, "code.other").is_none());
        assert!(query_selector(&dom.document, "div > pre > code").is_some());
        assert!(query_selector(&dom.document, "section > pre").is_none());
        assert!(query_selector(&dom.document, "pre[").is_none());
    }

    #[test]
    fn test_parse_fragment_keeps_leading_whitespace() {
        let nodes = parse_fragment("  <span class=\"k\">fn</span> main");
        assert_eq!(nodes.len(), 3);
        assert_eq!(node_text(&nodes[0]).as_deref(), Some("  "));
        assert_eq!(tag_name(&nodes[1]).as_deref(), Some("span"));
    }

    #[test]
    fn test_serialize_escapes_nbsp() {
        let span = create_span_with_text("\u{A0}\u{A0}x<y");
        append_inline_style(&span, "mso-spacerun:yes");
        let html = serialize_node(&span).expect("serialize");
        assert_eq!(
            html,
            "<span style=\"mso-spacerun:yes\">&nbsp;&nbsp;x&lt;y</span>"
        );
    }
}
