mod command;
mod export;
mod model;
mod query;
mod storage;

pub use crate::command::*;
pub use crate::export::*;
pub use crate::model::*;
pub use crate::query::*;
pub use crate::storage::*;
