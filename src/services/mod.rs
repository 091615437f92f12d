pub mod catalog;
pub mod completion;
pub mod context;
pub mod conversation;
pub mod relevance;
pub mod storage;
