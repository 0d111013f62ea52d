pub mod context;
pub mod error;
pub mod ops;
pub mod record;
pub mod stage;
pub mod value;

pub use context::Context;
pub use error::{ErrorKind, RillError};
pub use record::Record;
pub use stage::{Emitter, Item, Stage};
pub use value::{InferMode, Value, ValueType};
