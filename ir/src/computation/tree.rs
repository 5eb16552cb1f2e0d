//! Text and tree rendering of computations.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::rc::Rc;

use ptree::{Style, TreeItem};

use crate::computation::Computation;
use crate::node::display::NodeLine;
use crate::types::NodeId;

impl Computation {
    /// One node on one line, operands resolved to `%name`.
    pub fn render_node(&self, id: NodeId) -> String {
        let Ok(node) = self.node(id) else {
            return format!("<removed {id}>");
        };
        let operands: Vec<String> = node
            .operands()
            .iter()
            .map(|&operand| match self.node(operand) {
                Ok(operand) => format!("%{}", operand.name()),
                Err(_) => format!("<removed {operand}>"),
            })
            .collect();
        let mut line = NodeLine { node, operands: &operands }.to_string();
        if !node.control_predecessors().is_empty() {
            let predecessors: Vec<String> = node
                .control_predecessors()
                .iter()
                .filter_map(|&p| self.node(p).ok().map(|p| format!("%{}", p.name())))
                .collect();
            line.push_str(&format!(", control-predecessors={{{}}}", predecessors.join(", ")));
        }
        line
    }

    /// Whole computation, one node per line in post order, root marked `ROOT`.
    pub fn to_text(&self) -> String {
        let mut text = format!("{} {{\n", self.name());
        for id in self.post_order() {
            let prefix = if self.root() == Some(id) { "ROOT " } else { "" };
            text.push_str(&format!("  {prefix}{}\n", self.render_node(id)));
        }
        text.push('}');
        text
    }

    /// ASCII operand tree below the root. Shared operands are printed once;
    /// later occurrences show `%name (see above)`.
    pub fn tree(&self) -> String {
        let Some(root) = self.root() else {
            return format!("{} (no root)", self.name());
        };
        let tree = NodeTree { computation: self, id: root, visited: Rc::default(), is_backref: RefCell::new(false) };
        let mut buf = Vec::new();
        if ptree::write_tree(&tree, &mut buf).is_err() {
            return String::new();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[derive(Clone)]
struct NodeTree<'c> {
    computation: &'c Computation,
    id: NodeId,
    visited: Rc<RefCell<HashSet<NodeId>>>,
    is_backref: RefCell<bool>,
}

impl TreeItem for NodeTree<'_> {
    type Child = Self;

    fn write_self<W: io::Write>(&self, f: &mut W, _style: &Style) -> io::Result<()> {
        let name = self.computation.node(self.id).map(|node| node.name().to_string()).unwrap_or_default();
        let mut visited = self.visited.borrow_mut();
        if !visited.insert(self.id) {
            *self.is_backref.borrow_mut() = true;
            return write!(f, "%{name} (see above)");
        }
        match self.computation.node(self.id) {
            Ok(node) => write!(f, "{}", node.to_short_string()),
            Err(_) => write!(f, "<removed {}>", self.id),
        }
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        if *self.is_backref.borrow() {
            return Cow::Borrowed(&[]);
        }
        let Ok(node) = self.computation.node(self.id) else {
            return Cow::Borrowed(&[]);
        };
        let children = node
            .operands()
            .iter()
            .map(|&operand| NodeTree {
                computation: self.computation,
                id: operand,
                visited: self.visited.clone(),
                is_backref: RefCell::new(false),
            })
            .collect::<Vec<_>>();
        Cow::Owned(children)
    }
}
