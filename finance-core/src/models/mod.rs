mod auth;
mod financing_request;
mod governorate;
mod lookup;
mod personal_information;
mod reference_person;
mod request_status;
mod section;
mod upload;
mod work_details;

pub use auth::{AuthResponse, User};
pub use financing_request::{ErrorBody, FinancingRequestFormData, FinancingRequestResponse};
pub use governorate::{
    DEFAULT_AREA_ID, DEFAULT_GOVERNORATE_ID, GOVERNORATE_IDS, Governorate, fallback_governorates,
    governorate_id_for_name,
};
pub use lookup::{Brand, CarModel, Faculty, GroupedCarModels, University};
pub use personal_information::{PersonalField, PersonalInformation};
pub use reference_person::{CarChoice, ReferenceField, ReferencePerson};
pub use request_status::{FinanceRequest, FinanceRequestsResponse, Pagination};
pub use section::{SectionForm, UnknownFieldError, is_blank};
pub use upload::UploadFile;
pub use work_details::{WorkDetails, WorkField};
