mod errors;
mod requests;
mod responses;

pub use errors::ApiError;
pub use requests::*;
pub use responses::*;
