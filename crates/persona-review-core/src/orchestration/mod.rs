//! Persona review orchestration.
//!
//! Fans one document out to every configured persona and joins their
//! reports into a single document report.
//!
//! # Module layout
//!
//! - [`message`]: `AgentMessage`
//! - [`agent_node`]: `run_agent_node`, `build_request`
//! - [`graph`]: `ReviewGraph`, `ReviewConfig`, `join_agent_outputs`
//! - [`merge`]: `merge_agent_reports`

pub mod agent_node;
pub mod graph;
pub mod merge;
pub mod message;
