pub mod app_core;
pub mod dispatcher;
pub mod domain;
pub mod kernel;
pub mod persistence;
pub mod ports;
pub mod recorder;
pub mod viewmodel;

pub use app_core::*;
pub use dispatcher::{DispatchOptions, DispatchPermit, RegistrationDispatcher, SubmitError};
pub use domain::{AttemptId, DispatchState, FormSettings, FormState, ResetPolicy};
pub use kernel::FormSession;
pub use persistence::{default_store_root, FilePersistence};
pub use ports::*;
pub use recorder::StoreRecorder;
pub use viewmodel::*;
