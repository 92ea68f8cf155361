pub mod app;
pub mod avatar;
pub mod detail;
pub mod event;
pub mod list;
pub mod ui;
