pub mod chat;
pub mod rag;
