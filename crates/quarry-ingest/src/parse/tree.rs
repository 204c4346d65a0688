// Copyright 2025 Quarry Project
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Serialize;
use tree_sitter::Node;

/// Row/column position within a source file (0-based tree-sitter rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

/// One node of a parsed syntax tree. Children are arena indices into the
/// owning [`SyntaxTree`]; index children keep the tree free of ownership
/// cycles and cheap to walk for derived views.
#[derive(Debug, Clone, Serialize)]
pub struct SyntaxNode {
    pub kind: String,
    pub start: Point,
    pub end: Point,
    /// Raw source text, kept for leaf nodes only.
    pub text: Option<String>,
    pub children: Vec<u32>,
}

/// Arena of syntax nodes in pre-order, rooted at `root`.
#[derive(Debug, Clone, Serialize)]
pub struct SyntaxTree {
    nodes: Vec<SyntaxNode>,
    root: u32,
}

impl SyntaxTree {
    pub fn root(&self) -> &SyntaxNode {
        &self.nodes[self.root as usize]
    }

    pub fn node(&self, id: u32) -> Option<&SyntaxNode> {
        self.nodes.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Total nodes visited in a full pre-order traversal; a rough
    /// complexity signal for ranking.
    pub node_count: usize,
}

/// Derived artifact of parsing one file. Owned by the file record that
/// produced it and recomputed whenever that file's content changes.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    pub language: String,
    pub tree: SyntaxTree,
    /// Canonical parenthesized rendering of the tree shape.
    pub s_expression: String,
    pub stats: ParseStats,
}

/// Copy a tree-sitter tree into an arena, pre-order. Returns the arena and
/// the number of nodes visited.
pub(crate) fn build_tree(root: Node<'_>, src: &str) -> (SyntaxTree, usize) {
    let mut nodes: Vec<SyntaxNode> = Vec::new();
    let root_id = copy_node(root, src, &mut nodes);
    let count = nodes.len();
    (
        SyntaxTree {
            nodes,
            root: root_id,
        },
        count,
    )
}

fn copy_node(n: Node<'_>, src: &str, nodes: &mut Vec<SyntaxNode>) -> u32 {
    let id = nodes.len() as u32;
    nodes.push(SyntaxNode {
        kind: n.kind().to_string(),
        start: Point {
            row: n.start_position().row,
            column: n.start_position().column,
        },
        end: Point {
            row: n.end_position().row,
            column: n.end_position().column,
        },
        text: None,
        children: Vec::new(),
    });
    if n.child_count() == 0 {
        nodes[id as usize].text = n.utf8_text(src.as_bytes()).ok().map(str::to_string);
    } else {
        let mut children = Vec::with_capacity(n.child_count());
        for i in 0..n.child_count() {
            if let Some(c) = n.child(i) {
                children.push(copy_node(c, src, nodes));
            }
        }
        nodes[id as usize].children = children;
    }
    id
}
