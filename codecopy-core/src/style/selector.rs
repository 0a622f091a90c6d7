//! Selector matching over the `markup5ever_rcdom` tree.
//!
//! Selectors are parsed by the `selectors` crate with scraper's `Simple`
//! implementation and matched through [`selectors::Element`] implemented on
//! rcdom handles. Nothing here is interactive: pseudo-classes such as
//! `:hover` do not parse, so a group member using one is dropped and the rest
//! of the group still applies.

use crate::dom::{class_list, get_attribute, is_element, parent_element, parent_node};
use cssparser::{ParseError, Parser, ParserInput};
use markup5ever_rcdom::{Handle, NodeData};
use scraper::selector::{Parser as SimpleParser, Simple};
use selectors::attr::{AttrSelectorOperation, CaseSensitivity, NamespaceConstraint};
use selectors::bloom::BloomFilter;
use selectors::matching::{
    self, ElementSelectorFlags, MatchingContext, MatchingForInvalidation, MatchingMode,
    NeedsSelectorFlags, QuirksMode, SelectorCaches,
};
use selectors::parser::{ParseRelative, Selector, SelectorImpl, SelectorList};
use selectors::{Element, OpaqueElement};
use std::fmt;
use std::rc::Rc;

type Identifier = <Simple as SelectorImpl>::Identifier;
type LocalName = <Simple as SelectorImpl>::LocalName;
type NamespaceUrl = <Simple as SelectorImpl>::NamespaceUrl;
type AttrValue = <Simple as SelectorImpl>::AttrValue;

/// A comma-separated selector list.
#[derive(Debug, Clone)]
pub struct SelectorGroup {
    selectors: Vec<Selector<Simple>>,
}

impl SelectorGroup {
    /// Parse a selector list, keeping every member that parses. Returns
    /// `None` when no member does.
    pub fn parse(input: &str) -> Option<Self> {
        let mut parser_input = ParserInput::new(input);
        let mut parser = Parser::new(&mut parser_input);
        let members = parser
            .parse_comma_separated(|member| {
                let start = member.position();
                while member.next().is_ok() {}
                Ok::<_, ParseError<'_, ()>>(member.slice_from(start))
            })
            .ok()?;

        let selectors: Vec<_> = members.into_iter().filter_map(parse_selector).collect();
        if selectors.is_empty() {
            None
        } else {
            Some(SelectorGroup { selectors })
        }
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn matches(&self, element: &Handle) -> bool {
        self.specificity_for(element).is_some()
    }

    /// Specificity of the most specific member matching `element`.
    pub fn specificity_for(&self, element: &Handle) -> Option<u32> {
        if !is_element(element) {
            return None;
        }
        let element = NodeElement(element.clone());
        let mut caches = SelectorCaches::default();
        let mut context = MatchingContext::new(
            MatchingMode::Normal,
            None,
            &mut caches,
            QuirksMode::NoQuirks,
            NeedsSelectorFlags::No,
            MatchingForInvalidation::No,
        );
        self.selectors
            .iter()
            .filter(|selector| matching::matches_selector(selector, 0, None, &element, &mut context))
            .map(Selector::specificity)
            .max()
    }
}

fn parse_selector(text: &str) -> Option<Selector<Simple>> {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let list = SelectorList::parse(&SimpleParser, &mut parser, ParseRelative::No).ok()?;
    list.slice().first().cloned()
}

/// Element view of an rcdom node for the matcher.
#[derive(Clone)]
struct NodeElement(Handle);

impl fmt::Debug for NodeElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.data {
            NodeData::Element { name, .. } => write!(f, "<{}>", &*name.local),
            _ => f.write_str("<non-element>"),
        }
    }
}

impl NodeElement {
    fn local_name(&self) -> Option<&str> {
        match &self.0.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        }
    }

    fn sibling_element(&self, offset: isize) -> Option<Self> {
        let parent = parent_node(&self.0)?;
        let siblings = parent.children.borrow();
        let elements: Vec<&Handle> = siblings.iter().filter(|node| is_element(node)).collect();
        let index = elements.iter().position(|node| Rc::ptr_eq(node, &self.0))?;
        let target = index.checked_add_signed(offset)?;
        elements.get(target).map(|node| NodeElement((*node).clone()))
    }
}

impl Element for NodeElement {
    type Impl = Simple;

    fn opaque(&self) -> OpaqueElement {
        OpaqueElement::new(&*self.0)
    }

    fn parent_element(&self) -> Option<Self> {
        parent_element(&self.0).map(NodeElement)
    }

    fn parent_node_is_shadow_root(&self) -> bool {
        false
    }

    fn containing_shadow_host(&self) -> Option<Self> {
        None
    }

    fn is_pseudo_element(&self) -> bool {
        false
    }

    fn prev_sibling_element(&self) -> Option<Self> {
        self.sibling_element(-1)
    }

    fn next_sibling_element(&self) -> Option<Self> {
        self.sibling_element(1)
    }

    fn first_element_child(&self) -> Option<Self> {
        self.0
            .children
            .borrow()
            .iter()
            .find(|node| is_element(node))
            .map(|node| NodeElement(node.clone()))
    }

    fn is_html_element_in_html_document(&self) -> bool {
        match &self.0.data {
            NodeData::Element { name, .. } => &*name.ns == "http://www.w3.org/1999/xhtml",
            _ => false,
        }
    }

    fn has_local_name(&self, local_name: &<Simple as SelectorImpl>::BorrowedLocalName) -> bool {
        self.local_name()
            .is_some_and(|name| name.eq_ignore_ascii_case(&local_name.0))
    }

    fn has_namespace(&self, ns: &<Simple as SelectorImpl>::BorrowedNamespaceUrl) -> bool {
        match &self.0.data {
            NodeData::Element { name, .. } => *name.ns == **ns,
            _ => false,
        }
    }

    fn is_same_type(&self, other: &Self) -> bool {
        match (&self.0.data, &other.0.data) {
            (NodeData::Element { name: a, .. }, NodeData::Element { name: b, .. }) => a == b,
            _ => false,
        }
    }

    fn attr_matches(
        &self,
        ns: &NamespaceConstraint<&NamespaceUrl>,
        local_name: &LocalName,
        operation: &AttrSelectorOperation<&AttrValue>,
    ) -> bool {
        let NodeData::Element { attrs, .. } = &self.0.data else {
            return false;
        };
        attrs.borrow().iter().any(|attr| {
            let in_namespace = match ns {
                NamespaceConstraint::Any => true,
                NamespaceConstraint::Specific(url) => *attr.name.ns == ***url,
            };
            in_namespace && *attr.name.local == *local_name.0 && operation.eval_str(&attr.value)
        })
    }

    fn match_non_ts_pseudo_class(
        &self,
        _pseudo_class: &<Simple as SelectorImpl>::NonTSPseudoClass,
        _context: &mut MatchingContext<Simple>,
    ) -> bool {
        false
    }

    fn match_pseudo_element(
        &self,
        _pseudo_element: &<Simple as SelectorImpl>::PseudoElement,
        _context: &mut MatchingContext<Simple>,
    ) -> bool {
        false
    }

    fn apply_selector_flags(&self, _flags: ElementSelectorFlags) {}

    fn is_link(&self) -> bool {
        false
    }

    fn is_html_slot_element(&self) -> bool {
        false
    }

    fn has_id(&self, id: &Identifier, case_sensitivity: CaseSensitivity) -> bool {
        get_attribute(&self.0, "id")
            .is_some_and(|value| case_sensitivity.eq(value.as_bytes(), id.0.as_bytes()))
    }

    fn has_class(&self, name: &Identifier, case_sensitivity: CaseSensitivity) -> bool {
        class_list(&self.0)
            .iter()
            .any(|class| case_sensitivity.eq(class.as_bytes(), name.0.as_bytes()))
    }

    fn has_custom_state(&self, _name: &Identifier) -> bool {
        false
    }

    fn imported_part(&self, _name: &Identifier) -> Option<Identifier> {
        None
    }

    fn is_part(&self, _name: &Identifier) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        self.0.children.borrow().iter().all(|node| match &node.data {
            NodeData::Element { .. } => false,
            NodeData::Text { contents } => contents.borrow().is_empty(),
            _ => true,
        })
    }

    fn is_root(&self) -> bool {
        parent_node(&self.0).is_some_and(|parent| matches!(parent.data, NodeData::Document))
    }

    fn add_element_unique_hashes(&self, _filter: &mut BloomFilter) -> bool {
        false
    }
}
