//! These models represent the objects passed around by the agent
//!
//! There are a few related formats we need to interact with:
//! - openai-style messages/tools, sent from the agent to the LLM
//! - toolkit requests, sent from the agent to the toolkits providing tools
//! - the structured response schema the model must conform to per turn
//!
//! These overlap to varying degrees. We always immediately convert the wire
//! data into the internal structs using to/from helpers, so the internal
//! models are not an exact match to any single wire format.
pub mod content;
pub mod message;
pub mod response;
pub mod role;
pub mod tool;
