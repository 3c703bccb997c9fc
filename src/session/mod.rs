pub mod driver;
pub mod scenarios;

pub use driver::Session;
pub use scenarios::Scenario;
