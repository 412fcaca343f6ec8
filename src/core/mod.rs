pub mod column_mapper;
pub mod etl;
pub mod hours;
pub mod pipeline;
pub mod rounding;
pub mod transform;

pub use crate::domain::model::{CanonicalRecord, RawTable, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
