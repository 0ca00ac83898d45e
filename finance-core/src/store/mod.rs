mod observer;
mod section_store;

pub use observer::{Observers, SubscriptionId};
pub use section_store::{
    PersonalInformationStore, ReferencePersonStore, SectionStore, WorkDetailsStore,
};
