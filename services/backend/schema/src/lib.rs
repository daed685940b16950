pub mod api_keys;
pub mod auth_tokens;
pub mod magic_links;
pub mod rectangles;
pub mod users;
