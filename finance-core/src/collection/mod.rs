mod aggregator;
mod amount;
mod missing;

pub use aggregator::{CollectionError, CombinedFormData, ContactInfo, DataCollection};
pub use amount::parse_amount;
pub use missing::{Completeness, MissingField};
