//! Assembly of flat comment rows into reply trees.

use std::collections::HashMap;

use super::types::{Comment, CommentId, CommentView};

/// Builds the reply forest for one post from its flat comment rows.
///
/// Rows are expected in arrival (created-at ascending) order and that order is
/// kept both for the returned roots and for every `replies` list. A repeated
/// comment id keeps its first row. A comment whose parent is not among the
/// rows is dropped, and so is everything beneath it.
///
/// Depth is unbounded: nodes are attached from the leaves upward without
/// recursion.
pub fn build_comment_tree<I>(rows: I) -> Vec<CommentView>
where
    I: IntoIterator<Item = (Comment, String)>,
{
    let mut order: Vec<CommentId> = Vec::new();
    let mut nodes: HashMap<CommentId, CommentView> = HashMap::new();

    for (comment, username) in rows {
        if nodes.contains_key(&comment.id) {
            continue;
        }
        order.push(comment.id);
        nodes.insert(comment.id, CommentView::new(comment, username));
    }

    let mut roots: Vec<CommentId> = Vec::new();
    let mut children: HashMap<CommentId, Vec<CommentId>> = HashMap::new();

    for id in &order {
        match nodes.get(id).and_then(|node| node.parent_id) {
            None => roots.push(*id),
            Some(parent_id) if nodes.contains_key(&parent_id) => {
                children.entry(parent_id).or_default().push(*id);
            }
            // Orphan: its parent never arrived.
            Some(_) => {}
        }
    }

    roots
        .into_iter()
        .filter_map(|root| assemble(root, &mut nodes, &children))
        .collect()
}

/// Detaches the subtree under `root` from `nodes`, fully populated.
fn assemble(
    root: CommentId,
    nodes: &mut HashMap<CommentId, CommentView>,
    children: &HashMap<CommentId, Vec<CommentId>>,
) -> Option<CommentView> {
    let mut preorder = Vec::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        preorder.push(id);
        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().rev());
        }
    }

    // Children always follow their parent in pre-order, so walking it
    // backwards finishes every reply before it is moved into its parent.
    for id in preorder.iter().rev() {
        let Some(kids) = children.get(id) else {
            continue;
        };
        let replies: Vec<CommentView> = kids.iter().filter_map(|kid| nodes.remove(kid)).collect();
        if let Some(node) = nodes.get_mut(id) {
            node.replies = replies;
        }
    }

    nodes.remove(&root)
}

/// Counts every comment in a forest, replies included.
pub fn count_comments(forest: &[CommentView]) -> usize {
    let mut count = 0;
    let mut stack: Vec<&CommentView> = forest.iter().collect();

    while let Some(node) = stack.pop() {
        count += 1;
        stack.extend(node.replies.iter());
    }

    count
}
