//! Caller-side input for store mutations.

use chrono::{DateTime, Utc};

use super::model::{
    AssistantRef, InquiryActor, InquiryAttachment, InquiryStatus, InstructorRef, MessageId,
    MessageKind, ParentRef, StatusChange, StudentRef, Visibility,
};

/// A new inquiry whose identity fields come from the template record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInquiry {
    /// Subject line.
    pub title: String,
    /// Body of the opening message.
    pub content: String,
    /// Category label; `일반` when absent.
    pub category: Option<String>,
    /// Who opens the inquiry; a student when absent.
    pub role: Option<InquiryActor>,
    /// Author name; derived from the role and template when absent.
    pub author: Option<String>,
}

impl NewInquiry {
    /// Create a draft with only a title and opening message.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category: None,
            role: None,
            author: None,
        }
    }

    /// Set the category label.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set who opens the inquiry.
    #[must_use]
    pub fn role(mut self, role: InquiryActor) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the author display name.
    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// A new inquiry with caller-supplied identity fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudentInquiry {
    /// Subject line.
    pub title: String,
    /// Body of the opening message.
    pub content: String,
    /// Category label; `일반` when absent.
    pub category: Option<String>,
    /// Who opens the inquiry; a student when absent.
    pub role: Option<InquiryActor>,
    /// Author name; derived from the role and identity fields when absent.
    pub author: Option<String>,
    /// Subject of the thread.
    pub student: StudentRef,
    /// Parent contact.
    pub parent: Option<ParentRef>,
    /// Staff owner; the template's instructor when absent.
    pub instructor: Option<InstructorRef>,
    /// Delegate.
    pub assistant: Option<AssistantRef>,
    /// Attachments on the opening message.
    pub attachments: Vec<InquiryAttachment>,
    /// Starting status; derived from the role when absent.
    pub status: Option<InquiryStatus>,
}

impl NewStudentInquiry {
    /// Create a draft about `student`.
    #[must_use]
    pub fn new(title: impl Into<String>, content: impl Into<String>, student: StudentRef) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category: None,
            role: None,
            author: None,
            student,
            parent: None,
            instructor: None,
            assistant: None,
            attachments: Vec::new(),
            status: None,
        }
    }

    /// Set the category label.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set who opens the inquiry.
    #[must_use]
    pub fn role(mut self, role: InquiryActor) -> Self {
        self.role = Some(role);
        self
    }

    /// Set the author display name.
    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Set the parent contact.
    #[must_use]
    pub fn parent(mut self, parent: ParentRef) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the staff owner.
    #[must_use]
    pub fn instructor(mut self, instructor: InstructorRef) -> Self {
        self.instructor = Some(instructor);
        self
    }

    /// Set the delegate.
    #[must_use]
    pub fn assistant(mut self, assistant: AssistantRef) -> Self {
        self.assistant = Some(assistant);
        self
    }

    /// Attach a resource to the opening message.
    #[must_use]
    pub fn attachment(mut self, attachment: InquiryAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Override the starting status.
    #[must_use]
    pub fn status(mut self, status: InquiryStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// A message to append to an existing thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    /// Identifier; assigned by the store when absent.
    pub id: Option<MessageId>,
    /// Kind of author.
    pub role: InquiryActor,
    /// Author display name.
    pub author: String,
    /// Message body.
    pub content: String,
    /// Timestamp; the store's clock when absent.
    pub created_at: Option<DateTime<Utc>>,
    /// Attached resources.
    pub attachments: Vec<InquiryAttachment>,
    /// Advisory visibility flag.
    pub visibility: Option<Visibility>,
    /// Thread role; [`MessageKind::Message`] when absent.
    pub kind: Option<MessageKind>,
    /// When present the record moves to `to` as a side effect.
    pub changes_status: Option<StatusChange>,
}

impl NewMessage {
    /// Create a plain message.
    #[must_use]
    pub fn new(role: InquiryActor, author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            role,
            author: author.into(),
            content: content.into(),
            created_at: None,
            attachments: Vec::new(),
            visibility: None,
            kind: None,
            changes_status: None,
        }
    }

    /// Use a caller-chosen id.
    #[must_use]
    pub fn id(mut self, id: impl Into<MessageId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Use a caller-chosen timestamp.
    #[must_use]
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Attach a resource.
    #[must_use]
    pub fn attachment(mut self, attachment: InquiryAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Hide the message from students and parents.
    #[must_use]
    pub fn staff_only(mut self) -> Self {
        self.visibility = Some(Visibility::Staff);
        self
    }

    /// Set the thread role explicitly.
    #[must_use]
    pub fn kind(mut self, kind: MessageKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Record a status transition alongside the message.
    #[must_use]
    pub fn changing_status(mut self, from: InquiryStatus, to: InquiryStatus) -> Self {
        self.changes_status = Some(StatusChange { from, to });
        self
    }
}

/// Options for [`crate::InquiryStore::set_inquiry_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChangeOptions {
    /// Append a system audit message. On by default.
    pub record_message: bool,
    /// Audit message body; a templated sentence when absent.
    pub note: Option<String>,
    /// Audit message author; `시스템` when absent.
    pub author: Option<String>,
    /// Audit message visibility.
    pub visibility: Option<Visibility>,
}

impl Default for StatusChangeOptions {
    fn default() -> Self {
        Self {
            record_message: true,
            note: None,
            author: None,
            visibility: None,
        }
    }
}

impl StatusChangeOptions {
    /// Change the status without an audit message.
    #[must_use]
    pub fn silent() -> Self {
        Self {
            record_message: false,
            ..Self::default()
        }
    }

    /// Use `note` as the audit message body.
    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Attribute the audit message to `author`.
    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Hide the audit message from students and parents.
    #[must_use]
    pub fn staff_only(mut self) -> Self {
        self.visibility = Some(Visibility::Staff);
        self
    }
}
