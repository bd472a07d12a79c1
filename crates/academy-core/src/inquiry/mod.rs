//! Inquiry threads between students, parents and academy staff.
//!
//! This module provides:
//! - **Record model**: inquiries, their messages, attachments and status
//! - **Store**: the observable snapshot holder and its mutation API
//! - **Identity resolution**: forgiving lookup for stale or legacy ids
//! - **Selectors**: memoized projections and self-updating lookups
//!
//! # Status workflow
//!
//! `조교 이관` → `강사 검토` → `답변 완료` → `학생/학부모 확인 완료` → `종료`
//!
//! The store records every transition in the thread rather than policing
//! which transitions are allowed.

mod draft;
mod model;
mod mutation;
mod resolver;
mod seed;
mod selector;
mod store;

pub use draft::{NewInquiry, NewMessage, NewStudentInquiry, StatusChangeOptions};
pub use model::{
    AssistantRef, AttachmentKind, Audience, InquiryActor, InquiryAttachment, InquiryId,
    InquiryMessage, InquiryRecord, InquiryStatus, InstructorRef, MessageId, MessageKind,
    ParentRef, StatusChange, StudentRef, Visibility,
};
pub use mutation::{DEFAULT_CATEGORY, SYSTEM_AUTHOR, status_change_note};
pub use resolver::{CANONICAL_PREFIX, LEGACY_PREFIX, resolve_inquiry_id};
pub use seed::seed_inquiries;
pub use selector::{InquiryWatch, Selector};
pub use store::{InquiryStore, Snapshot, Subscription};
