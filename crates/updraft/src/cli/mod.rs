pub mod app;
pub mod fetch;
mod tracker;
