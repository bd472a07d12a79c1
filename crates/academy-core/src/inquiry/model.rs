//! Inquiry record model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for an inquiry record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InquiryId(pub String);

impl InquiryId {
    /// Create a new inquiry ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InquiryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InquiryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of a message, unique within its inquiry's thread only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    /// Create a new message ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Workflow status of an inquiry.
///
/// Variants are declared in workflow order. The store accepts any transition;
/// the order only drives [`InquiryStatus::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InquiryStatus {
    /// Routed to a teaching assistant.
    #[serde(rename = "조교 이관")]
    AssistantRouted,
    /// Under instructor review.
    #[serde(rename = "강사 검토")]
    InstructorReview,
    /// Staff has answered.
    #[serde(rename = "답변 완료")]
    Answered,
    /// The student or parent confirmed the answer.
    #[serde(rename = "학생/학부모 확인 완료")]
    RequesterConfirmed,
    /// Closed.
    #[serde(rename = "종료")]
    Closed,
}

impl InquiryStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 5] = [
        Self::AssistantRouted,
        Self::InstructorReview,
        Self::Answered,
        Self::RequesterConfirmed,
        Self::Closed,
    ];

    /// Display label, also used as the serialized form.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AssistantRouted => "조교 이관",
            Self::InstructorReview => "강사 검토",
            Self::Answered => "답변 완료",
            Self::RequesterConfirmed => "학생/학부모 확인 완료",
            Self::Closed => "종료",
        }
    }

    /// Parse a status label. Anything outside the closed set yields `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|status| status.label() == s)
    }

    /// The status the workflow conventionally moves to next.
    #[must_use]
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::AssistantRouted => Some(Self::InstructorReview),
            Self::InstructorReview => Some(Self::Answered),
            Self::Answered => Some(Self::RequesterConfirmed),
            Self::RequesterConfirmed => Some(Self::Closed),
            Self::Closed => None,
        }
    }

    /// Whether no workflow step drives this status any further.
    ///
    /// Advisory only; [`crate::InquiryStore::set_inquiry_status`] still
    /// accepts a move out of a terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl std::fmt::Display for InquiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Who (or what) produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InquiryActor {
    /// The student the inquiry is about.
    #[default]
    Student,
    /// A parent or guardian.
    Parent,
    /// A teaching assistant.
    Assistant,
    /// The owning instructor.
    Instructor,
    /// Store-generated audit entries.
    System,
}

impl InquiryActor {
    /// Convert to the serialized string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Parent => "parent",
            Self::Assistant => "assistant",
            Self::Instructor => "instructor",
            Self::System => "system",
        }
    }

    /// Students and parents open inquiries; everyone else is staff-side.
    #[must_use]
    pub const fn is_requester(&self) -> bool {
        matches!(self, Self::Student | Self::Parent)
    }

    /// Assistants and instructors.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Assistant | Self::Instructor)
    }

    /// Status a new inquiry opened by this actor starts in.
    #[must_use]
    pub const fn default_status(&self) -> InquiryStatus {
        if self.is_requester() {
            InquiryStatus::AssistantRouted
        } else {
            InquiryStatus::Answered
        }
    }
}

/// The student an inquiry is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    /// Display name.
    pub name: String,
    /// Academy student number.
    pub student_id: String,
    /// School grade, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

/// Secondary contact for an inquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentRef {
    /// Display name.
    pub name: String,
}

/// Staff owner of an inquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorRef {
    /// Display name.
    pub name: String,
    /// Profile picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Teaching assistant the inquiry was delegated to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantRef {
    /// Display name.
    pub name: String,
    /// Initials shown in the avatar bubble.
    pub initials: String,
}

/// Kind of attached resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// Picture.
    Image,
    /// Generic document.
    File,
    /// Video clip or embed.
    Video,
}

/// Descriptive reference to an attached resource. The store owns no content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryAttachment {
    /// Identifier.
    pub id: String,
    /// Display label, usually the file name.
    pub label: String,
    /// Download location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Embeddable player location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
    /// Human-readable size, e.g. "1.2MB".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Kind of resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AttachmentKind>,
}

impl InquiryAttachment {
    /// Create an attachment with only an id and label.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            url: None,
            embed_url: None,
            size: None,
            kind: None,
        }
    }
}

/// Who may see a message. Carried for consuming views; never enforced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Everyone on the thread.
    #[default]
    All,
    /// Assistants and instructors only.
    Staff,
}

/// Role a message plays in its thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// The thread-opening message.
    Initial,
    /// Any later message.
    Message,
}

/// The state machine edge a message accompanied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Status before the transition.
    pub from: InquiryStatus,
    /// Status after the transition.
    pub to: InquiryStatus,
}

/// The reader a consuming view renders a thread for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Students and parents.
    Family,
    /// Assistants and instructors.
    Staff,
}

/// One entry in an inquiry thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryMessage {
    /// Identifier, unique within the thread.
    pub id: MessageId,
    /// Kind of author.
    pub role: InquiryActor,
    /// Author display name.
    pub author: String,
    /// Message body.
    pub content: String,
    /// When the message was posted.
    pub created_at: DateTime<Utc>,
    /// Attached resources.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<InquiryAttachment>,
    /// Advisory visibility flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    /// Thread-opening marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
    /// Status transition this message accompanied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes_status: Option<StatusChange>,
}

impl InquiryMessage {
    /// Whether a view rendering for `audience` should show this message.
    #[must_use]
    pub fn is_visible_to(&self, audience: Audience) -> bool {
        match audience {
            Audience::Staff => true,
            Audience::Family => self.visibility != Some(Visibility::Staff),
        }
    }

    /// Whether this is the thread-opening message.
    #[must_use]
    pub fn is_initial(&self) -> bool {
        self.kind == Some(MessageKind::Initial)
    }
}

/// One support thread between a student or parent and staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryRecord {
    /// Stable identifier.
    pub id: InquiryId,
    /// Subject line.
    pub title: String,
    /// Free-text category label.
    pub category: String,
    /// Current workflow status.
    pub status: InquiryStatus,
    /// When the inquiry was opened.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the latest message; maintained by the store.
    pub updated_at: DateTime<Utc>,
    /// Subject of the thread.
    pub student: StudentRef,
    /// Optional parent contact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
    /// Staff owner.
    pub instructor: InstructorRef,
    /// Optional delegate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant: Option<AssistantRef>,
    /// Thread, oldest first.
    pub messages: Vec<InquiryMessage>,
}

impl InquiryRecord {
    /// The most recent message.
    #[must_use]
    pub fn latest_message(&self) -> Option<&InquiryMessage> {
        self.messages.last()
    }

    /// The first message marked as thread-opening.
    #[must_use]
    pub fn initial_message(&self) -> Option<&InquiryMessage> {
        self.messages.iter().find(|m| m.is_initial())
    }

    /// Look up a message by id.
    #[must_use]
    pub fn message(&self, id: &MessageId) -> Option<&InquiryMessage> {
        self.messages.iter().find(|m| &m.id == id)
    }

    /// Status transitions recorded in the thread, oldest first.
    pub fn status_history(&self) -> impl Iterator<Item = StatusChange> + '_ {
        self.messages.iter().filter_map(|m| m.changes_status)
    }

    /// Messages a view rendering for `audience` should show.
    pub fn visible_messages(&self, audience: Audience) -> impl Iterator<Item = &InquiryMessage> {
        self.messages
            .iter()
            .filter(move |m| m.is_visible_to(audience))
    }
}
