pub mod beer;
pub mod filters;
pub mod preference;

pub use beer::*;
pub use filters::*;
pub use preference::*;
