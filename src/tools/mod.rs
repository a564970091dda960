//! Deterministic tools
//!
//! Provides the five handlers the agents dispatch to:
//! - StoreContent / Answer over content memory
//! - SendMail over the mail transport
//! - FetchEmployeeField / UpdateEmployeeField over the employee store

pub mod types;
pub mod registry;
pub mod content;
pub mod mail;
pub mod employee;

// Re-export commonly used types
pub use types::{SideEffect, ToolResult, ToolSchema, ToolStatus};
pub use registry::{ToolHandler, ToolRegistry};
pub use content::{AnswerTool, StoreContentTool, ANSWER, NO_CONTENT_MESSAGE, STORE_CONTENT};
pub use mail::{parse_mail_request, MailRequest, SendMailTool, DEFAULT_SUBJECT, SEND_MAIL};
pub use employee::{
    FetchEmployeeFieldTool, UpdateEmployeeFieldTool, FETCH_EMPLOYEE_FIELD, UPDATE_EMPLOYEE_FIELD,
};
