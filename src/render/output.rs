//! Command output history, newest first.

use crate::view::Node;

/// One read-only block per response. `history` is in arrival order; the
/// key is the arrival position so earlier blocks never change identity.
pub fn render(history: &[String]) -> Vec<Node> {
    history
        .iter()
        .enumerate()
        .rev()
        .map(|(seq, response)| {
            Node::new("pre")
                .key(format!("out-{seq}"))
                .text(response.as_str())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Region;
    use crate::view::reconcile::{Patch, reconcile};

    #[test]
    fn newest_block_comes_first() {
        let history = vec!["one".to_string(), "two".to_string()];
        let nodes = render(&history);
        assert_eq!(nodes[0].text.as_deref(), Some("two"));
        assert_eq!(nodes[1].text.as_deref(), Some("one"));
    }

    #[test]
    fn new_response_is_prepended_without_touching_older_blocks() {
        let mut history = vec!["one".to_string()];
        let before = render(&history);
        history.push("two".to_string());
        let after = render(&history);

        let patches = reconcile(Region::Output, &before, &after);
        assert_eq!(patches.len(), 1);
        assert!(matches!(&patches[0], Patch::Insert { index: 0, key, .. } if key == "out-1"));
    }
}
