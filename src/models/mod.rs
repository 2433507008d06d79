pub mod assignment;
pub mod metadata;
pub mod profile;
pub mod selected;

pub use assignment::{Assignment, FieldKey, TemplateMessage, Value};
pub use metadata::{DatasetAttributes, MetadataField, PlatformMetadata, WigosId};
pub use profile::{Observation, Profile};
pub use selected::{SelectedLevel, SelectedProfile};
