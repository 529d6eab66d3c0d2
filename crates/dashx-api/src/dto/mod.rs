//! Request and response bodies of the HTTP API. Fields are camelCase.

pub mod request;
pub mod response;
