//! Renderers: pure functions from panel state to a region's node list.
//!
//! Each renderer produces the complete desired tree for its region; the
//! document reconciles it against what is already on the page.

pub mod circuit;
pub mod header;
pub mod menu;
pub mod options;
pub mod output;
