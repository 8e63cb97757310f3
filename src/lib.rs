#![allow(async_fn_in_trait)]

pub mod api;
pub mod cli;
pub mod config;
pub mod entities;
pub mod error;
pub mod export;
pub mod import;
pub mod media;
pub mod session;
pub mod storage;
pub mod upload;
