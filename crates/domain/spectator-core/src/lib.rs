pub mod endpoint;
pub mod outcome;
pub mod region;
pub mod validate;

pub use endpoint::{
    mask_secret, EndpointDraft, EndpointField, EndpointSubmission, FieldEdit, ParseFieldError,
};
pub use outcome::SubmissionOutcome;
pub use region::Region;
pub use validate::{check_field, validate_submission, FieldError, ValidationMode};
