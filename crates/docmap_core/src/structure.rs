use serde::{Deserialize, Serialize};

use crate::block::ContentBlock;

/// One node of the inferred documentation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleNode {
    pub name: String,
    pub description: String,
    pub submodules: Vec<ModuleNode>,
}

impl ModuleNode {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            submodules: Vec::new(),
        }
    }

    /// Total number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.submodules
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Longest root-to-leaf distance; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        self.submodules
            .iter()
            .map(|child| 1 + child.depth())
            .max()
            .unwrap_or(0)
    }

    fn prune_empty(&mut self) {
        for child in &mut self.submodules {
            child.prune_empty();
        }
        self.submodules
            .retain(|child| !(child.description.is_empty() && child.submodules.is_empty()));
    }
}

/// Folds an ordered heading sequence into a module tree.
///
/// Headings nest under the nearest still-open heading of a lower level; a
/// heading with no such ancestor becomes a direct child of the root. Skipped
/// levels (an `h3` right after an `h1`) simply nest one step down.
#[derive(Debug, Clone)]
pub struct StructureBuilder {
    root_name: String,
    prune_empty: bool,
}

impl StructureBuilder {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
            prune_empty: false,
        }
    }

    pub fn with_prune_empty(mut self, prune_empty: bool) -> Self {
        self.prune_empty = prune_empty;
        self
    }

    pub fn build(&self, blocks: &[ContentBlock]) -> ModuleNode {
        let mut root = ModuleNode::new(self.root_name.clone(), "");
        // Open headings above the root, shallowest first.
        let mut open: Vec<(u8, ModuleNode)> = Vec::new();

        for block in blocks {
            let level = block.level.max(1);
            while open.last().is_some_and(|(top, _)| *top >= level) {
                close_top(&mut root, &mut open);
            }
            open.push((level, ModuleNode::new(block.heading.clone(), block.body.clone())));
        }
        while !open.is_empty() {
            close_top(&mut root, &mut open);
        }

        if self.prune_empty {
            root.prune_empty();
        }
        root
    }
}

fn close_top(root: &mut ModuleNode, open: &mut Vec<(u8, ModuleNode)>) {
    if let Some((_, node)) = open.pop() {
        match open.last_mut() {
            Some((_, parent)) => parent.submodules.push(node),
            None => root.submodules.push(node),
        }
    }
}
