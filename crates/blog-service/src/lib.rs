//! # blog-service
//!
//! Application layer containing the comment and vote use cases and their DTOs.

pub mod dto;
pub mod services;

pub use services::{
    CommentService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    VoteService,
};
