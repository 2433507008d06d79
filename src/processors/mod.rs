pub mod batch_processor;
pub mod profile_selector;
pub mod publication;
pub mod upcast;

pub use batch_processor::{BatchProcessor, BatchReport, FileOutcome};
pub use profile_selector::{ProfileSelector, QcPolicy, QcPolicyConfig};
pub use publication::{check_publication, Publication};
pub use upcast::{extract_cast, inflection_points, upcast_start, CastDirection};
