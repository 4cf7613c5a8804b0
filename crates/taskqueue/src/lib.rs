pub mod dispatch;
pub mod error;
pub mod store;
pub mod worker;

pub use dispatch::{Dispatcher, DispatcherSettings};
pub use error::TaskError;
pub use store::TaskStore;
