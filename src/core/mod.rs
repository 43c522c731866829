pub mod etl;
pub mod inspect;
pub mod pipeline;

pub use crate::domain::model::{SaleRecord, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
