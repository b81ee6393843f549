//! # EHR Web
//!
//! 影像分析、摘要生成和患者查询的HTTP接口。

pub mod error;
pub mod handlers;
pub mod imaging;
pub mod patients;
pub mod server;
pub mod static_files;
pub mod summary;

pub use error::{ApiError, ApiResult};
pub use patients::PatientDirectory;
pub use server::{create_app, AppState, WebConfig, WebServer};
pub use summary::{Summarizer, TemplateSummarizer};
