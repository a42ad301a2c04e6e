//! Keyed reconciliation of a region's top-level nodes.
//!
//! Patches are ordered so that applying them front to back yields the next
//! tree: every removal first, then a walk over the next nodes in order that
//! inserts new (or moved) keys at their final index and updates the rest.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use super::{Node, Region};

/// One minimal structural update to a region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Patch {
    Insert {
        region: Region,
        key: String,
        index: usize,
        html: String,
    },
    Remove {
        region: Region,
        key: String,
    },
    Update {
        region: Region,
        key: String,
        delta: ElementDelta,
    },
}

impl Patch {
    pub fn region(&self) -> Region {
        match self {
            Patch::Insert { region, .. }
            | Patch::Remove { region, .. }
            | Patch::Update { region, .. } => *region,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            Patch::Insert { key, .. } | Patch::Remove { key, .. } | Patch::Update { key, .. } => {
                key
            }
        }
    }
}

/// Changes turning one element into another of the same tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementDelta {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub set_attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove_attrs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub add_classes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub remove_classes: Vec<String>,
    /// Full inline style after the change, set when any property differs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildDelta>,
    /// Replacement markup for all children when their structure differs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace_children: Option<String>,
}

impl ElementDelta {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A delta for the child at `index` of the parent element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildDelta {
    pub index: usize,
    pub delta: ElementDelta,
}

/// Reconciliation key of a top-level node: its explicit key, or its position.
fn node_key(node: &Node, position: usize) -> String {
    node.key.clone().unwrap_or_else(|| format!("#{position}"))
}

/// Diff the previous and next top-level nodes of `region`.
pub fn reconcile(region: Region, prev: &[Node], next: &[Node]) -> Vec<Patch> {
    let prev_keyed: Vec<(String, &Node)> = prev
        .iter()
        .enumerate()
        .map(|(i, node)| (node_key(node, i), node))
        .collect();
    let next_keyed: Vec<(String, &Node)> = next
        .iter()
        .enumerate()
        .map(|(i, node)| (node_key(node, i), node))
        .collect();

    let prev_by_key: HashMap<&str, &Node> = prev_keyed
        .iter()
        .map(|(key, node)| (key.as_str(), *node))
        .collect();
    let next_keys: HashSet<&str> = next_keyed.iter().map(|(key, _)| key.as_str()).collect();

    // Keys present on both sides, in previous order.
    let retained: Vec<&str> = prev_keyed
        .iter()
        .map(|(key, _)| key.as_str())
        .filter(|key| next_keys.contains(key))
        .collect();

    // Walk the next order against the retained order; anything out of step
    // is moved. A tag change also forces a reinsert.
    let mut moved: HashSet<&str> = HashSet::new();
    let mut cursor = 0;
    for (key, node) in &next_keyed {
        let Some(old) = prev_by_key.get(key.as_str()) else {
            continue;
        };
        while cursor < retained.len() && moved.contains(retained[cursor]) {
            cursor += 1;
        }
        if cursor < retained.len() && retained[cursor] == key.as_str() && old.tag == node.tag {
            cursor += 1;
        } else {
            moved.insert(key.as_str());
        }
    }

    let mut patches = Vec::new();

    for (key, _) in &prev_keyed {
        if !next_keys.contains(key.as_str()) || moved.contains(key.as_str()) {
            patches.push(Patch::Remove {
                region,
                key: key.clone(),
            });
        }
    }

    for (index, (key, node)) in next_keyed.iter().enumerate() {
        match prev_by_key.get(key.as_str()) {
            Some(old) if !moved.contains(key.as_str()) => {
                let delta = diff_element(old, node);
                if !delta.is_empty() {
                    patches.push(Patch::Update {
                        region,
                        key: key.clone(),
                        delta,
                    });
                }
            }
            _ => patches.push(Patch::Insert {
                region,
                key: key.clone(),
                index,
                html: node.to_html(),
            }),
        }
    }

    patches
}

/// Compute the delta between two elements of the same tag.
pub fn diff_element(old: &Node, new: &Node) -> ElementDelta {
    let mut delta = ElementDelta::default();

    for (name, value) in &new.attrs {
        if old.attrs.get(name) != Some(value) {
            delta.set_attrs.insert(name.clone(), value.clone());
        }
    }
    delta.remove_attrs = old
        .attrs
        .keys()
        .filter(|name| !new.attrs.contains_key(*name))
        .cloned()
        .collect();

    delta.add_classes = new
        .classes
        .iter()
        .filter(|c| !old.has_class(c))
        .cloned()
        .collect();
    delta.remove_classes = old
        .classes
        .iter()
        .filter(|c| !new.has_class(c))
        .cloned()
        .collect();

    if old.styles != new.styles {
        delta.style = Some(new.style_text());
    }

    let same_shape = old.children.len() == new.children.len()
        && old
            .children
            .iter()
            .zip(&new.children)
            .all(|(a, b)| a.tag == b.tag && a.key == b.key);

    if !same_shape {
        delta.replace_children = Some(new.inner_html());
    } else if old.text != new.text {
        if new.children.is_empty() {
            delta.text = Some(new.text.clone().unwrap_or_default());
        } else {
            delta.replace_children = Some(new.inner_html());
        }
    } else {
        delta.children = old
            .children
            .iter()
            .zip(&new.children)
            .enumerate()
            .filter_map(|(index, (a, b))| {
                let child = diff_element(a, b);
                (!child.is_empty()).then_some(ChildDelta {
                    index,
                    delta: child,
                })
            })
            .collect();
    }

    delta
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn block(key: &str, text: &str) -> Node {
        Node::new("div").key(key).class("step").text(text)
    }

    fn keys_of(patches: &[Patch]) -> Vec<(&'static str, String)> {
        patches
            .iter()
            .map(|p| {
                let op = match p {
                    Patch::Insert { .. } => "insert",
                    Patch::Remove { .. } => "remove",
                    Patch::Update { .. } => "update",
                };
                (op, p.key().to_string())
            })
            .collect()
    }

    #[test]
    fn identical_trees_produce_no_patches() {
        let nodes = vec![block("a", "A"), block("b", "B")];
        assert!(reconcile(Region::Circuit, &nodes, &nodes.clone()).is_empty());
    }

    #[test]
    fn first_render_inserts_everything_in_order() {
        let next = vec![block("a", "A"), block("b", "B")];
        let patches = reconcile(Region::Circuit, &[], &next);
        assert_eq!(
            patches,
            vec![
                Patch::Insert {
                    region: Region::Circuit,
                    key: "a".to_string(),
                    index: 0,
                    html: next[0].to_html(),
                },
                Patch::Insert {
                    region: Region::Circuit,
                    key: "b".to_string(),
                    index: 1,
                    html: next[1].to_html(),
                },
            ]
        );
    }

    #[test]
    fn only_the_delta_is_patched() {
        let prev = vec![block("a", "A"), block("b", "B"), block("c", "C")];
        let next = vec![block("a", "A"), block("c", "C2"), block("d", "D")];
        let patches = reconcile(Region::Circuit, &prev, &next);

        assert_eq!(
            keys_of(&patches),
            vec![
                ("remove", "b".to_string()),
                ("update", "c".to_string()),
                ("insert", "d".to_string()),
            ]
        );
        match &patches[1] {
            Patch::Update { delta, .. } => assert_eq!(delta.text.as_deref(), Some("C2")),
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn prepended_node_is_a_single_insert() {
        let prev = vec![block("out-0", "first")];
        let next = vec![block("out-1", "second"), block("out-0", "first")];
        let patches = reconcile(Region::Output, &prev, &next);
        assert_eq!(keys_of(&patches), vec![("insert", "out-1".to_string())]);
        match &patches[0] {
            Patch::Insert { index, .. } => assert_eq!(*index, 0),
            other => panic!("expected insert, got {other:?}"),
        }
    }

    #[test]
    fn reordered_node_is_moved() {
        let prev = vec![block("a", "A"), block("b", "B"), block("c", "C")];
        let next = vec![block("c", "C"), block("a", "A"), block("b", "B")];
        let patches = reconcile(Region::Circuit, &prev, &next);
        assert_eq!(
            keys_of(&patches),
            vec![("remove", "c".to_string()), ("insert", "c".to_string())]
        );
    }

    #[test]
    fn class_and_style_changes_are_attribute_level() {
        let old = Node::new("div").class("step").style("left", "0%");
        let new = Node::new("div")
            .class("step")
            .class("current")
            .style("left", "50%");
        let delta = diff_element(&old, &new);
        assert_eq!(delta.add_classes, vec!["current".to_string()]);
        assert!(delta.remove_classes.is_empty());
        assert_eq!(delta.style.as_deref(), Some("left: 50%;"));
        assert!(delta.replace_children.is_none());
    }

    #[test]
    fn nested_change_is_addressed_by_child_index() {
        let row = |value: &str| {
            Node::new("tr")
                .key("param-count")
                .child(Node::new("td").child(Node::new("p").text("count")))
                .child(Node::new("td").child(Node::new("input").attr("value", value)))
        };
        let delta = diff_element(&row("5"), &row("7"));
        assert_eq!(delta.children.len(), 1);
        assert_eq!(delta.children[0].index, 1);
        let input = &delta.children[0].delta.children[0].delta;
        assert_eq!(input.set_attrs.get("value").map(String::as_str), Some("7"));
    }

    #[test]
    fn changed_child_structure_replaces_children() {
        let old = Node::new("div").child(Node::new("span"));
        let new = Node::new("div")
            .child(Node::new("span"))
            .child(Node::new("span"));
        let delta = diff_element(&old, &new);
        assert_eq!(delta.replace_children.as_deref(), Some("<span></span><span></span>"));
    }

    #[test]
    fn removed_attribute_is_listed() {
        let old = Node::new("button").attr("step", 1).attr("param", "x");
        let new = Node::new("button").attr("step", 1);
        let delta = diff_element(&old, &new);
        assert_eq!(delta.remove_attrs, vec!["param".to_string()]);
        assert!(delta.set_attrs.is_empty());
    }
}
