#![forbid(unsafe_code)]

//! In-memory [`Environment`] for tests.
//!
//! `TestEnvironment` models just enough of a document to exercise the
//! primitives: an element tree with focus-relevant properties, an active
//! element, attachment, and a scroll-lock flag. Every focus move is recorded
//! so tests can assert on the exact sequence.
//!
//! Available in this crate's tests and, for downstream crates, behind the
//! `test-helpers` feature.
//!
//! ```ignore
//! use faria_core::element::ElementInfo;
//! use faria_core::environment::Environment;
//! use faria_core::testing::TestEnvironment;
//!
//! let env = TestEnvironment::new();
//! let dialog = env.append(env.root(), ElementInfo::generic());
//! let ok = env.append(dialog, ElementInfo::button());
//! assert_eq!(env.focusable_descendants(dialog), vec![ok]);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::element::{ElementId, ElementInfo};
use crate::environment::{Environment, SharedEnvironment};

#[derive(Debug)]
struct Node {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    info: ElementInfo,
    attached: bool,
}

#[derive(Debug)]
struct Tree {
    root: ElementId,
    nodes: HashMap<ElementId, Node>,
    active: Option<ElementId>,
    scroll_locked: bool,
    reduced_motion: bool,
    focus_log: Vec<ElementId>,
}

impl Tree {
    fn collect_focusable(&self, id: ElementId, out: &mut Vec<ElementId>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        for &child in &node.children {
            let Some(child_node) = self.nodes.get(&child) else {
                continue;
            };
            if !child_node.attached || child_node.info.hidden {
                continue;
            }
            if child_node.info.is_focusable() {
                out.push(child);
            }
            self.collect_focusable(child, out);
        }
    }

    fn mark_detached(&mut self, id: ElementId) {
        let children = match self.nodes.get_mut(&id) {
            Some(node) => {
                node.attached = false;
                node.children.clone()
            }
            None => return,
        };
        if self.active == Some(id) {
            self.active = None;
        }
        for child in children {
            self.mark_detached(child);
        }
    }
}

/// In-memory element tree implementing [`Environment`].
#[derive(Debug)]
pub struct TestEnvironment {
    tree: RefCell<Tree>,
}

impl TestEnvironment {
    /// Create an environment holding a single attached root ("body").
    #[must_use]
    pub fn new() -> Rc<Self> {
        let root = ElementId::next();
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                parent: None,
                children: Vec::new(),
                info: ElementInfo::generic(),
                attached: true,
            },
        );
        Rc::new(Self {
            tree: RefCell::new(Tree {
                root,
                nodes,
                active: None,
                scroll_locked: false,
                reduced_motion: false,
                focus_log: Vec::new(),
            }),
        })
    }

    /// Upcast to the shared trait-object handle.
    #[must_use]
    pub fn shared(self: &Rc<Self>) -> SharedEnvironment {
        Rc::clone(self) as SharedEnvironment
    }

    /// The document root.
    #[must_use]
    pub fn root(&self) -> ElementId {
        self.tree.borrow().root
    }

    /// Append a new element as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was never created by this environment.
    pub fn append(&self, parent: ElementId, info: ElementInfo) -> ElementId {
        let mut tree = self.tree.borrow_mut();
        let id = ElementId::next();
        let parent_node = tree
            .nodes
            .get_mut(&parent)
            .unwrap_or_else(|| panic!("unknown parent element {parent:?}"));
        parent_node.children.push(id);
        let attached = parent_node.attached;
        tree.nodes.insert(
            id,
            Node {
                parent: Some(parent),
                children: Vec::new(),
                info,
                attached,
            },
        );
        id
    }

    /// Append several children at once, returning their IDs in order.
    pub fn append_all(&self, parent: ElementId, infos: &[ElementInfo]) -> Vec<ElementId> {
        infos.iter().map(|info| self.append(parent, *info)).collect()
    }

    /// Remove `element` (and its subtree) from the document.
    pub fn detach(&self, element: ElementId) {
        let mut tree = self.tree.borrow_mut();
        let parent = tree.nodes.get(&element).and_then(|n| n.parent);
        if let Some(parent) = parent
            && let Some(parent_node) = tree.nodes.get_mut(&parent)
        {
            parent_node.children.retain(|&c| c != element);
        }
        tree.mark_detached(element);
    }

    /// Replace an element's focus-relevant properties.
    pub fn set_info(&self, element: ElementId, info: ElementInfo) {
        if let Some(node) = self.tree.borrow_mut().nodes.get_mut(&element) {
            node.info = info;
        }
    }

    /// Toggle the `disabled` flag.
    pub fn set_disabled(&self, element: ElementId, disabled: bool) {
        if let Some(node) = self.tree.borrow_mut().nodes.get_mut(&element) {
            node.info.disabled = disabled;
        }
    }

    /// Toggle the hidden flag.
    pub fn set_hidden(&self, element: ElementId, hidden: bool) {
        if let Some(node) = self.tree.borrow_mut().nodes.get_mut(&element) {
            node.info.hidden = hidden;
        }
    }

    /// Set the active element directly, as a user click would, without
    /// recording it in the focus log.
    pub fn set_active(&self, element: Option<ElementId>) {
        self.tree.borrow_mut().active = element;
    }

    /// Set the reduced-motion preference.
    pub fn set_reduced_motion(&self, reduced: bool) {
        self.tree.borrow_mut().reduced_motion = reduced;
    }

    /// Every element focused through [`Environment::focus`], in order.
    #[must_use]
    pub fn focus_log(&self) -> Vec<ElementId> {
        self.tree.borrow().focus_log.clone()
    }

    /// Forget the recorded focus moves.
    pub fn clear_focus_log(&self) {
        self.tree.borrow_mut().focus_log.clear();
    }
}

impl Environment for TestEnvironment {
    fn active_element(&self) -> Option<ElementId> {
        self.tree.borrow().active
    }

    fn focus(&self, element: ElementId) {
        let mut tree = self.tree.borrow_mut();
        let attached = tree.nodes.get(&element).is_some_and(|n| n.attached);
        if attached {
            tree.active = Some(element);
            tree.focus_log.push(element);
        }
    }

    fn is_attached(&self, element: ElementId) -> bool {
        self.tree
            .borrow()
            .nodes
            .get(&element)
            .is_some_and(|n| n.attached)
    }

    fn contains(&self, container: ElementId, element: ElementId) -> bool {
        let tree = self.tree.borrow();
        let mut current = Some(element);
        while let Some(id) = current {
            if id == container {
                return true;
            }
            current = tree.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    fn focusable_descendants(&self, container: ElementId) -> Vec<ElementId> {
        let tree = self.tree.borrow();
        let mut out = Vec::new();
        if tree.nodes.get(&container).is_some_and(|n| n.attached) {
            tree.collect_focusable(container, &mut out);
        }
        out
    }

    fn scroll_locked(&self) -> bool {
        self.tree.borrow().scroll_locked
    }

    fn set_scroll_locked(&self, locked: bool) {
        self.tree.borrow_mut().scroll_locked = locked;
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.tree.borrow().reduced_motion
    }
}
