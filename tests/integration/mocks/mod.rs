//! Mock implementations and fixture helpers shared by the integration tests.


pub use models::*;
pub use repositories::*;
