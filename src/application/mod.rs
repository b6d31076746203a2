//! Application layer managing state and business workflows.
//!
//! This module coordinates between the domain layer and presentation layer:
//! wizard navigation, form state, provisional data and the review page.

pub mod form;
pub mod resource;
pub mod review;
pub mod session;
pub mod state;
pub mod wizard;

pub use form::*;
pub use resource::*;
pub use review::*;
pub use session::*;
pub use state::*;
pub use wizard::*;
