/// The in-page agent JavaScript implementation.
/// This string is injected into browser contexts by drivers.
pub const AGENT_JS: &str = include_str!("agent.js");

/// Expression that evaluates to `true` once the agent is installed.
pub const AGENT_PROBE: &str = "typeof window.ApplyBot !== 'undefined'";
