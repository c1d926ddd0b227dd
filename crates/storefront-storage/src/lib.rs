pub mod media;
pub mod mem;
pub mod traits;

pub use media::LocalImageHost;
pub use mem::InMemoryStore;
pub use traits::*;
