
mod comment_test;
mod router_test;
mod term_test;
mod title_test;
mod user_test;
