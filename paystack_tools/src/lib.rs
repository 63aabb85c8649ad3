mod api;
mod config;
mod error;

mod data_objects;

pub use api::PaystackApi;
pub use config::PaystackConfig;
pub use data_objects::{
    InitializeRequest,
    InitializeResponse,
    SplitResponse,
    SubaccountShare,
    VerifyData,
    VerifyResponse,
};
pub use error::PaystackApiError;
