pub mod classify;
pub mod model;
pub mod normalize;
pub mod service;
pub mod summary;
pub mod validation;

pub use model::{Reading, SubmitReading};
pub use service::{IngestError, IngestService};
pub use summary::{Summary, SummaryAggregator};
pub use validation::ValidationError;
