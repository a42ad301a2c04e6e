//! Header toggle reflecting the remote run status.

use crate::view::Node;

/// The loop toggle. `btn-danger` while running, `btn-success` while
/// stopped; neither before the first status has arrived.
pub fn render(status: Option<bool>) -> Vec<Node> {
    let label = match status {
        Some(true) => "Stop loop",
        Some(false) => "Start loop",
        None => "Loop",
    };

    vec![
        Node::new("button")
            .key("loop-action")
            .class("loop-action")
            .class("btn")
            .class_if("btn-success", status == Some(false))
            .class_if("btn-danger", status == Some(true))
            .attr("type", "button")
            .text(label),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_are_mutually_exclusive() {
        let running = &render(Some(true))[0];
        assert!(running.has_class("btn-danger"));
        assert!(!running.has_class("btn-success"));

        let stopped = &render(Some(false))[0];
        assert!(stopped.has_class("btn-success"));
        assert!(!stopped.has_class("btn-danger"));

        let unknown = &render(None)[0];
        assert!(!unknown.has_class("btn-success") && !unknown.has_class("btn-danger"));
    }
}
