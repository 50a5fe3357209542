pub mod billing;
pub mod business;
pub mod plan;
pub mod user;

pub use billing::*;
pub use business::*;
pub use plan::*;
pub use user::*;
