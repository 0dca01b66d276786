//! Request and response bodies

pub mod email_verification;

pub use email_verification::{
    MessageResponse, SendCodeRequest, SendCodeResponse, StatusResponse, TestEmailRequest,
    VerifyCodeRequest, VerifyCodeResponse,
};
