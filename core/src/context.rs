//! Session creation for example programs.

mod flow_context;

pub use flow_context::FlowContext;

use crate::traits::RddResult;
use dalgo_common::{LoggingConfig, SessionConfig, init_logging};

/// Build a context for `example` on `master`.
///
/// Environment overrides are applied on top of the defaults and logging is
/// installed from the resolved configuration.
pub fn create_session(example: Option<&str>, master: &str) -> RddResult<FlowContext> {
    let config = SessionConfig::for_example(example, master)?.with_env_overrides()?;
    create_session_with(config)
}

/// Build a context from an already resolved configuration.
pub fn create_session_with(config: SessionConfig) -> RddResult<FlowContext> {
    init_logging(&LoggingConfig::from_session(&config))?;
    FlowContext::new(config)
}
