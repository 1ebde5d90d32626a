//! Small CSV utilities: row selection by key and element-wise mean of
//! several same-shaped files.

pub mod error;
pub mod logging;
pub mod mean;
pub mod select;
pub mod stream;
pub mod table;

pub use error::{Error, Result};
pub use mean::{mean_tables, FreezeLayout, FrozenTable};
pub use select::{select_rows, SelectSummary};
pub use stream::{Sink, Source};
