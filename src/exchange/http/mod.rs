pub mod driver;

pub use driver::HttpExchange;
