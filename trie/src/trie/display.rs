// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Human-readable tree rendering for debugging. Not part of the lookup hot
//! path.

use crate::trie::{PrefixTrie, TrieNode};
use std::fmt::{Display, Formatter};

impl<T: Display> Display for PrefixTrie<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        render(&self.root, f, "", true, 0)
    }
}

fn symbol<T: Display>(node: &TrieNode<T>) -> String {
    node.payload
        .as_ref()
        .map_or_else(|| "#".to_string(), ToString::to_string)
}

/// Draw `node` and its subtree. Absent children of a node that has at least
/// one child are drawn as `#` dead ends, so both branches of every drawn
/// fork are visible.
fn render<T: Display>(
    node: &TrieNode<T>,
    f: &mut Formatter<'_>,
    indent: &str,
    tail: bool,
    depth: u8,
) -> std::fmt::Result {
    let connector = if tail { "└─" } else { "├─" };
    writeln!(f, "{indent} {connector} {} (/{depth})", symbol(node))?;
    let indent = if tail {
        format!("{indent}   ")
    } else {
        format!("{indent} │ ")
    };

    if node.left.is_none() && node.right.is_none() {
        return Ok(());
    }

    match &node.left {
        Some(left) => render(left, f, &indent, false, depth + 1)?,
        None => writeln!(f, "{indent} ├─ # (/{})", depth + 1)?,
    }
    match &node.right {
        Some(right) => render(right, f, &indent, true, depth + 1),
        None => writeln!(f, "{indent} └─ # (/{})", depth + 1),
    }
}
