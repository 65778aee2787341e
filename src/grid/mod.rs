pub mod builder;
pub mod jscode;
pub mod options;
pub mod render;
