//! Circuit layout: the step queue as positioned blocks.
//!
//! Vertical position is the queue index times the step height; horizontal
//! position is the step's pipe lane. Blocks sharing a lane and index overlap;
//! there is no collision avoidance.

use serde::Serialize;

use crate::scenario::{Scenario, Step};
use crate::view::Node;

/// Width of one lane as a percentage of the track.
///
/// `100 / max(pipe)`. Steps without a usable pipe are ignored; if none has
/// one (or the maximum is not positive) the single lane spans the track.
pub fn lane_width(queue: &[Step]) -> f64 {
    let max_pipe = queue
        .iter()
        .filter_map(Step::pipe)
        .fold(None, |acc: Option<f64>, pipe| {
            Some(acc.map_or(pipe, |max| max.max(pipe)))
        });

    match max_pipe {
        Some(max) if max > 0.0 => 100.0 / max,
        _ => 100.0,
    }
}

/// Where one step block sits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub left_pct: f64,
    pub width_pct: f64,
    pub top_px: u32,
    pub height_px: u32,
}

/// Place every step of the queue, in queue order.
pub fn layout(queue: &[Step], step_height: u32) -> Vec<Placement> {
    let width = lane_width(queue);
    queue
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let lane = step.pipe().unwrap_or(1.0);
            Placement {
                left_pct: (lane - 1.0) * width,
                width_pct: width,
                top_px: index as u32 * step_height,
                height_px: step_height,
            }
        })
        .collect()
}

/// Step blocks keyed by queue index; the selected one carries `current`.
pub fn render(scenario: &Scenario, step_height: u32) -> Vec<Node> {
    scenario
        .queue
        .iter()
        .zip(layout(&scenario.queue, step_height))
        .enumerate()
        .map(|(index, (step, place))| {
            Node::new("div")
                .key(format!("step-{index}"))
                .class("step")
                .class("well")
                .class_if("current", scenario.is_current(index))
                .attr("data-step", index)
                .style("top", format!("{}px", place.top_px))
                .style("height", format!("{}px", place.height_px))
                .style("left", format!("{}%", place.left_pct))
                .style("width", format!("{}%", place.width_pct))
                .text(step.name.as_str())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::reconcile::reconcile;
    use crate::view::Region;
    use serde_json::json;

    fn scenario(value: serde_json::Value) -> Scenario {
        serde_json::from_value(value).unwrap()
    }

    fn two_pipes() -> Scenario {
        scenario(json!({
            "queue": [
                {"name": "filter", "params": {"pipe": 1}},
                {"name": "merge", "params": {"pipe": 2}}
            ]
        }))
    }

    #[test]
    fn two_pipes_split_the_track() {
        let s = two_pipes();
        assert_eq!(lane_width(&s.queue), 50.0);

        let places = layout(&s.queue, 64);
        assert_eq!(places[0].left_pct, 0.0);
        assert_eq!(places[1].left_pct, 50.0);
        assert_eq!(places[0].top_px, 0);
        assert_eq!(places[1].top_px, 64);

        let nodes = render(&s, 64);
        assert!(nodes.iter().all(|n| !n.has_class("current")));
        assert_eq!(nodes[1].styles["left"], "50%");
        assert_eq!(nodes[1].styles["width"], "50%");
        assert_eq!(nodes[1].styles["top"], "64px");
    }

    #[test]
    fn lane_width_times_max_pipe_is_the_track() {
        for max in 1..=7 {
            let queue: Vec<Step> = (1..=max)
                .map(|pipe| serde_json::from_value(json!({"name": "s", "params": {"pipe": pipe}})).unwrap())
                .collect();
            let total = lane_width(&queue) * max as f64;
            assert!((total - 100.0).abs() < 1e-9, "max {max}: {total}");
        }
    }

    #[test]
    fn steps_in_the_same_lane_overlap_horizontally() {
        let s = scenario(json!({
            "queue": [
                {"name": "a", "params": {"pipe": 3}},
                {"name": "b", "params": {"pipe": 3}},
                {"name": "c", "params": {"pipe": 1}}
            ]
        }));
        let places = layout(&s.queue, 10);
        assert_eq!(places[0].left_pct, places[1].left_pct);
        assert_eq!(places[2].left_pct, 0.0);
        assert_eq!(places[2].top_px, 20);
    }

    #[test]
    fn missing_pipe_lands_in_first_lane() {
        let s = scenario(json!({
            "queue": [{"name": "lonely", "params": {}}]
        }));
        assert_eq!(lane_width(&s.queue), 100.0);
        assert_eq!(layout(&s.queue, 64)[0].left_pct, 0.0);
    }

    #[test]
    fn selection_highlights_exactly_one_block() {
        let mut s = two_pipes();
        assert!(s.select(1));
        let nodes = render(&s, 64);
        let highlighted: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.has_class("current"))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(highlighted, vec![1]);
    }

    #[test]
    fn rerender_of_unchanged_queue_is_a_no_op() {
        let s = two_pipes();
        let first = render(&s, 64);
        let second = render(&s, 64);
        assert!(reconcile(Region::Circuit, &first, &second).is_empty());
    }

    #[test]
    fn fractional_lane_width_uses_shortest_form() {
        let s = scenario(json!({
            "queue": [
                {"name": "a", "params": {"pipe": 1}},
                {"name": "b", "params": {"pipe": 3}}
            ]
        }));
        let nodes = render(&s, 64);
        assert_eq!(nodes[1].styles["width"], format!("{}%", 100.0_f64 / 3.0));
        assert_eq!(nodes[1].styles["left"], format!("{}%", 2.0 * (100.0_f64 / 3.0)));
    }
}
