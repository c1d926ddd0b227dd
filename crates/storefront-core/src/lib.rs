pub mod errors;
pub mod media;
pub mod model;
pub mod query;
pub mod token;
pub mod util;

pub use errors::*;
pub use media::*;
pub use model::*;
pub use query::*;
