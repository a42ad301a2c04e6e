//! Command menu for the selected step's module.

use crate::scenario::Module;
use crate::view::Node;

/// One row per command: argument input, run control, help block.
///
/// The input is hidden for commands that take no argument. Both the input
/// and the run control carry the command name so a click can find its
/// argument text; the run control also carries the module it targets.
pub fn render(module_name: &str, module: &Module) -> Vec<Node> {
    module
        .iter()
        .map(|(name, command)| {
            let input = Node::new("input")
                .class("form-control")
                .class_if("hide", command.param_count == 0)
                .attr("type", "text")
                .attr("command", name)
                .attr("placeholder", &command.descr_param);

            let run = Node::new("span")
                .class("command-run")
                .class("btn")
                .class("input-group-addon")
                .attr("command", name)
                .attr("module", module_name)
                .text(command.descr.as_str());

            Node::new("div")
                .key(format!("cmd-{name}"))
                .class("command")
                .class("row")
                .child(Node::new("div").class("input-group").child(input).child(run))
                .child(Node::new("span").class("help-block"))
        })
        .collect()
}
