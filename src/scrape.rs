pub mod fallback;
pub mod fetch;
pub mod registry;
pub mod slug;
