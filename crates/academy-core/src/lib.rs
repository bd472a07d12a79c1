//! # academy-core
//!
//! Core business logic for the Academy operations front end.
//!
//! This crate provides:
//! - **Inquiry Store** - observable snapshot of student/parent/staff inquiry threads
//! - **Status Workflow** - five-step inquiry status with an audit message per transition
//! - **Identity Resolution** - forgiving lookup for stale, legacy or row-number ids
//! - **Persistence Adapters** - optional best-effort mirroring to local storage
//! - **Configuration** - persistence mode selection from a JSON settings file
//!
//! ## Example
//!
//! ```ignore
//! use academy_core::{InquiryStatus, InquiryStore, NewInquiry, StatusChangeOptions};
//!
//! let store = InquiryStore::mock_only();
//! let id = store.create_inquiry(NewInquiry::new("결제 문의", "환불 요청합니다"));
//! store.set_inquiry_status(&id, InquiryStatus::Answered, StatusChangeOptions::default());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod inquiry;
pub mod persistence;

pub use config::{ConfigError, PersistenceMode, StoreConfig};
pub use error::{Error, Result};
pub use inquiry::{
    Audience, InquiryActor, InquiryAttachment, InquiryId, InquiryMessage, InquiryRecord,
    InquiryStatus, InquiryStore, InquiryWatch, MessageId, NewInquiry, NewMessage,
    NewStudentInquiry, Selector, Snapshot, StatusChangeOptions, Subscription,
    resolve_inquiry_id,
};
pub use persistence::{
    FileStorage, KeyValueAdapter, KeyValueStorage, MemoryStorage, NullAdapter,
    PersistenceAdapter,
};
