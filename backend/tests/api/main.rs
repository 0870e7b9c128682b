#[macro_use]
mod helper;

mod dispatch;
mod session;
mod templates;
