pub mod api_key;
pub mod credential;
pub mod magic_link;
pub mod profile;
pub mod rectangle;
