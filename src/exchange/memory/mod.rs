pub mod driver;

pub use driver::MemoryExchange;
