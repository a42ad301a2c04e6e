//! Parameter table of the selected step.

use std::collections::BTreeMap;

use crate::scenario::Step;
use crate::scenario::params::{NewParamKind, ParamFormat, display_value};
use crate::view::Node;

/// Key of the persistent add-new-parameter row.
pub const NEW_PARAM_ROW: &str = "new-param";

/// Rendered parameter rows plus the format each row was rendered with.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionsRender {
    pub rows: Vec<Node>,
    pub formats: BTreeMap<String, ParamFormat>,
}

/// One editable row per parameter, then the add-new row.
///
/// Every control carries the step index it edits; per-parameter controls
/// also carry the parameter name.
pub fn render(step: &Step, index: usize) -> OptionsRender {
    let mut formats = BTreeMap::new();
    let mut rows: Vec<Node> = step
        .params
        .iter()
        .map(|(name, value)| {
            let format = ParamFormat::of(value);
            formats.insert(name.clone(), format);
            param_row(name, format, &display_value(value), index)
        })
        .collect();
    rows.push(new_param_row(index));

    OptionsRender { rows, formats }
}

fn param_row(name: &str, format: ParamFormat, value: &str, index: usize) -> Node {
    Node::new("tr")
        .key(format!("param-{name}"))
        .child(Node::new("td").child(Node::new("p").class("form-control-static").text(name)))
        .child(
            Node::new("td").child(
                Node::new("input")
                    .class("form-control")
                    .attr("param", name)
                    .attr("format", format)
                    .attr("value", value),
            ),
        )
        .child(Node::new("td").child(action_button("btn-primary", "\u{2714}", name, index)))
        .child(Node::new("td").child(action_button("btn-danger", "\u{00D7}", name, index)))
}

fn action_button(style: &str, label: &str, param: &str, index: usize) -> Node {
    Node::new("button")
        .class("btn")
        .class(style)
        .attr("type", "button")
        .attr("param", param)
        .attr("step", index)
        .text(label)
}

fn new_param_row(index: usize) -> Node {
    let kinds = NewParamKind::ALL.into_iter().fold(
        Node::new("select").class("form-control").class("new-type"),
        |select, kind| select.child(Node::new("option").attr("value", kind).text(kind.as_str())),
    );

    Node::new("tr")
        .key(NEW_PARAM_ROW)
        .child(
            Node::new("td").child(
                Node::new("input")
                    .class("form-control")
                    .class("new-param")
                    .attr("placeholder", "name"),
            ),
        )
        .child(
            Node::new("td").child(
                Node::new("input")
                    .class("form-control")
                    .class("new-value")
                    .attr("placeholder", "value"),
            ),
        )
        .child(Node::new("td").child(kinds))
        .child(
            Node::new("td").child(
                Node::new("button")
                    .class("btn")
                    .class("btn-success")
                    .attr("type", "button")
                    .attr("step", index)
                    .text("+"),
            ),
        )
}
