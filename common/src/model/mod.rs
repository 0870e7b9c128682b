pub mod datasource;
pub mod dispatch;
pub mod recipient;
pub mod tag;
pub mod template;
