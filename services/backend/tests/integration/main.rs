mod helpers;

mod api_key_test;
mod rectangle_test;
