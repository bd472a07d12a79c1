//! Pure snapshot transformations behind the store's mutation API.
//!
//! Each function takes the current collection and returns the next one,
//! leaving the input untouched. `None` means nothing changed and no new
//! snapshot should be published.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::draft::{NewMessage, NewStudentInquiry, StatusChangeOptions};
use super::model::{
    AssistantRef, InquiryActor, InquiryId, InquiryMessage, InquiryRecord, InquiryStatus,
    InstructorRef, MessageId, MessageKind, ParentRef, StatusChange, StudentRef,
};
use super::resolver::CANONICAL_PREFIX;

/// Category used when the caller gives none.
pub const DEFAULT_CATEGORY: &str = "일반";

/// Author of store-generated audit messages.
pub const SYSTEM_AUTHOR: &str = "시스템";

/// Default audit message body for a transition.
#[must_use]
pub fn status_change_note(from: InquiryStatus, to: InquiryStatus) -> String {
    format!("상태가 '{from}'에서 '{to}'(으)로 변경되었습니다.")
}

/// Display name to attribute a message to when the caller gives none.
pub(crate) fn default_author(
    role: InquiryActor,
    student: &StudentRef,
    parent: Option<&ParentRef>,
    instructor: &InstructorRef,
    assistant: Option<&AssistantRef>,
) -> String {
    match role {
        InquiryActor::Student => student.name.clone(),
        InquiryActor::Parent => parent.map_or_else(
            || format!("{} 학부모", student.name),
            |p| p.name.clone(),
        ),
        InquiryActor::Assistant => {
            assistant.map_or_else(|| instructor.name.clone(), |a| a.name.clone())
        }
        InquiryActor::Instructor => instructor.name.clone(),
        InquiryActor::System => SYSTEM_AUTHOR.to_string(),
    }
}

/// Next free `inq-<n>` id: one past the largest numeric suffix in use.
pub(crate) fn next_inquiry_id(records: &[InquiryRecord]) -> InquiryId {
    let next = records
        .iter()
        .filter_map(|r| numeric_suffix(r.id.as_str(), CANONICAL_PREFIX))
        .max()
        .map_or(1, |n| n.saturating_add(1));
    InquiryId::new(format!("{CANONICAL_PREFIX}{next}"))
}

/// Next free `msg-<n>` id within one thread.
fn next_message_id(record: &InquiryRecord) -> MessageId {
    let next = record
        .messages
        .iter()
        .filter_map(|m| numeric_suffix(m.id.as_str(), "msg-"))
        .max()
        .map_or(1, |n| n.saturating_add(1));
    MessageId::new(format!("msg-{next}"))
}

fn numeric_suffix(id: &str, prefix: &str) -> Option<u64> {
    id.strip_prefix(prefix)?.parse().ok()
}

/// Timestamp for a new message: never earlier than the thread's last one.
fn stamp(
    record: &InquiryRecord,
    requested: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let at = requested.unwrap_or(now);
    record
        .latest_message()
        .map_or(at, |last| at.max(last.created_at))
}

/// Build a record from a draft whose identity fields are already complete.
pub(crate) fn create(
    records: &[InquiryRecord],
    draft: NewStudentInquiry,
    template_instructor: &InstructorRef,
    now: DateTime<Utc>,
) -> (Vec<InquiryRecord>, InquiryId) {
    let id = next_inquiry_id(records);
    let role = draft.role.unwrap_or_default();
    let instructor = draft
        .instructor
        .unwrap_or_else(|| template_instructor.clone());
    let author = draft.author.unwrap_or_else(|| {
        default_author(
            role,
            &draft.student,
            draft.parent.as_ref(),
            &instructor,
            draft.assistant.as_ref(),
        )
    });

    let opening = InquiryMessage {
        id: MessageId::new("msg-1"),
        role,
        author,
        content: draft.content,
        created_at: now,
        attachments: draft.attachments,
        visibility: None,
        kind: Some(MessageKind::Initial),
        changes_status: None,
    };

    let record = InquiryRecord {
        id: id.clone(),
        title: draft.title,
        category: draft
            .category
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        status: draft.status.unwrap_or_else(|| role.default_status()),
        created_at: now,
        updated_at: now,
        student: draft.student,
        parent: draft.parent,
        instructor,
        assistant: draft.assistant,
        messages: vec![opening],
    };

    let mut next = Vec::with_capacity(records.len() + 1);
    next.push(record);
    next.extend_from_slice(records);
    (next, id)
}

/// Copy `records`, applying `edit` to the record with exactly `id`.
fn edit_record(
    records: &[InquiryRecord],
    id: &InquiryId,
    edit: impl FnOnce(&mut InquiryRecord) -> bool,
) -> Option<Vec<InquiryRecord>> {
    let index = records.iter().position(|r| &r.id == id)?;
    let mut updated = records[index].clone();
    if !edit(&mut updated) {
        return None;
    }
    let mut next = records.to_vec();
    next[index] = updated;
    Some(next)
}

/// Append a message to the record with exactly `id`.
pub(crate) fn append_message(
    records: &[InquiryRecord],
    id: &InquiryId,
    message: NewMessage,
    now: DateTime<Utc>,
) -> Option<Vec<InquiryRecord>> {
    edit_record(records, id, |record| {
        let created_at = stamp(record, message.created_at, now);
        let message_id = match message.id {
            Some(requested) if record.message(&requested).is_some() => {
                let assigned = next_message_id(record);
                debug!(
                    inquiry = %record.id,
                    requested = %requested,
                    assigned = %assigned,
                    "Message id already in thread; assigning a fresh one"
                );
                assigned
            }
            Some(requested) => requested,
            None => next_message_id(record),
        };
        if let Some(change) = message.changes_status {
            record.status = change.to;
        }
        record.messages.push(InquiryMessage {
            id: message_id,
            role: message.role,
            author: message.author,
            content: message.content,
            created_at,
            attachments: message.attachments,
            visibility: message.visibility,
            kind: Some(message.kind.unwrap_or(MessageKind::Message)),
            changes_status: message.changes_status,
        });
        record.updated_at = created_at;
        true
    })
}

/// Move the record with exactly `id` to `next`, recording the edge unless
/// the options suppress it.
pub(crate) fn change_status(
    records: &[InquiryRecord],
    id: &InquiryId,
    next: InquiryStatus,
    options: StatusChangeOptions,
    now: DateTime<Utc>,
) -> Option<Vec<InquiryRecord>> {
    edit_record(records, id, |record| {
        let from = record.status;
        if options.record_message {
            let created_at = stamp(record, None, now);
            let message = InquiryMessage {
                id: next_message_id(record),
                role: InquiryActor::System,
                author: options
                    .author
                    .unwrap_or_else(|| SYSTEM_AUTHOR.to_string()),
                content: options
                    .note
                    .unwrap_or_else(|| status_change_note(from, next)),
                created_at,
                attachments: Vec::new(),
                visibility: options.visibility,
                kind: Some(MessageKind::Message),
                changes_status: Some(StatusChange { from, to: next }),
            };
            record.messages.push(message);
            record.updated_at = created_at;
        }
        record.status = next;
        true
    })
}

/// Remove exactly one message from the record with exactly `id`.
///
/// The sole remaining message of a thread is never removed.
pub(crate) fn remove_message(
    records: &[InquiryRecord],
    id: &InquiryId,
    message_id: &MessageId,
) -> Option<Vec<InquiryRecord>> {
    edit_record(records, id, |record| {
        let Some(position) = record.messages.iter().position(|m| &m.id == message_id) else {
            return false;
        };
        if record.messages.len() == 1 {
            warn!(
                inquiry = %record.id,
                message = %message_id,
                "Refusing to delete the only message of an inquiry"
            );
            return false;
        }
        record.messages.remove(position);
        if let Some(latest) = record.latest_message() {
            record.updated_at = latest.created_at;
        }
        true
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::inquiry::seed::seed_inquiries;
    use chrono::Duration;

    fn record<'a>(records: &'a [InquiryRecord], id: &str) -> &'a InquiryRecord {
        records.iter().find(|r| r.id.as_str() == id).unwrap()
    }

    mod id_tests {
        use super::*;

        #[test]
        fn next_inquiry_id_follows_largest_suffix() {
            let records = seed_inquiries();
            assert_eq!(next_inquiry_id(&records).as_str(), "inq-9");
        }

        #[test]
        fn next_inquiry_id_ignores_foreign_ids() {
            let mut records = seed_inquiries();
            records.truncate(1);
            records[0].id = InquiryId::new("legacy-77");
            assert_eq!(next_inquiry_id(&records).as_str(), "inq-1");
        }

        #[test]
        fn next_message_id_skips_deleted_gaps() {
            let records = seed_inquiries();
            let mut r = record(&records, "inq-4").clone();
            r.messages.remove(1);
            assert_eq!(next_message_id(&r).as_str(), "msg-5");
        }
    }

    mod create_tests {
        use super::*;

        #[test]
        fn prepends_and_leaves_input_untouched() {
            let records = seed_inquiries();
            let template = records[0].instructor.clone();
            let draft = NewStudentInquiry::new("질문", "내용", records[2].student.clone());
            let (next, id) = create(&records, draft, &template, Utc::now());

            assert_eq!(next.len(), records.len() + 1);
            assert_eq!(next[0].id, id);
            assert_eq!(&next[1..], &records[..]);
        }

        #[test]
        fn staff_author_defaults_to_answered() {
            let records = seed_inquiries();
            let template = records[0].instructor.clone();
            let draft = NewStudentInquiry::new("공지", "내용", records[0].student.clone())
                .role(InquiryActor::Instructor);
            let (next, _) = create(&records, draft, &template, Utc::now());

            assert_eq!(next[0].status, InquiryStatus::Answered);
            assert_eq!(next[0].messages[0].author, template.name);
            assert_eq!(next[0].category, DEFAULT_CATEGORY);
        }
    }

    mod append_tests {
        use super::*;

        #[test]
        fn unknown_id_changes_nothing() {
            let records = seed_inquiries();
            let message = NewMessage::new(InquiryActor::Student, "누구", "안녕하세요");
            assert!(append_message(&records, &"inq-404".into(), message, Utc::now()).is_none());
        }

        #[test]
        fn early_timestamp_is_clamped_to_latest() {
            let records = seed_inquiries();
            let latest = record(&records, "inq-2").updated_at;
            let message = NewMessage::new(InquiryActor::Parent, "이정호", "늦은 답장")
                .at(latest - Duration::days(3));
            let next = append_message(&records, &"inq-2".into(), message, Utc::now()).unwrap();

            let updated = record(&next, "inq-2");
            assert_eq!(updated.latest_message().unwrap().created_at, latest);
            assert_eq!(updated.updated_at, latest);
        }

        #[test]
        fn colliding_message_id_is_replaced() {
            let records = seed_inquiries();
            let message = NewMessage::new(InquiryActor::Student, "최예린", "다시 질문")
                .id("msg-1");
            let next = append_message(&records, &"inq-4".into(), message, Utc::now()).unwrap();

            let updated = record(&next, "inq-4");
            let added = updated.latest_message().unwrap();
            assert_eq!(added.id.as_str(), "msg-5");
            assert_eq!(added.content, "다시 질문");
            let ones = updated.messages.iter().filter(|m| m.id.as_str() == "msg-1");
            assert_eq!(ones.count(), 1);
        }

        #[test]
        fn unused_message_id_is_kept() {
            let records = seed_inquiries();
            let message = NewMessage::new(InquiryActor::Student, "최예린", "추가").id("reply-a");
            let next = append_message(&records, &"inq-4".into(), message, Utc::now()).unwrap();
            assert_eq!(
                record(&next, "inq-4").latest_message().unwrap().id.as_str(),
                "reply-a"
            );
        }

        #[test]
        fn status_change_message_moves_status() {
            let records = seed_inquiries();
            let message = NewMessage::new(InquiryActor::Instructor, "최유나", "답변드립니다")
                .changing_status(InquiryStatus::InstructorReview, InquiryStatus::Answered);
            let next = append_message(&records, &"inq-2".into(), message, Utc::now()).unwrap();

            assert_eq!(record(&next, "inq-2").status, InquiryStatus::Answered);
            assert_eq!(record(&records, "inq-2").status, InquiryStatus::InstructorReview);
        }
    }

    mod status_tests {
        use super::*;

        #[test]
        fn default_note_names_both_statuses() {
            assert_eq!(
                status_change_note(InquiryStatus::Answered, InquiryStatus::Closed),
                "상태가 '답변 완료'에서 '종료'(으)로 변경되었습니다."
            );
        }

        #[test]
        fn silent_change_keeps_updated_at() {
            let records = seed_inquiries();
            let before = record(&records, "inq-3").clone();
            let next = change_status(
                &records,
                &"inq-3".into(),
                InquiryStatus::Closed,
                StatusChangeOptions::silent(),
                Utc::now(),
            )
            .unwrap();

            let after = record(&next, "inq-3");
            assert_eq!(after.status, InquiryStatus::Closed);
            assert_eq!(after.messages, before.messages);
            assert_eq!(after.updated_at, before.updated_at);
        }

        #[test]
        fn custom_note_and_author_are_used() {
            let records = seed_inquiries();
            let options = StatusChangeOptions::default()
                .note("강사 확인 필요")
                .author("이수진")
                .staff_only();
            let next = change_status(
                &records,
                &"inq-1".into(),
                InquiryStatus::InstructorReview,
                options,
                Utc::now(),
            )
            .unwrap();

            let audit = record(&next, "inq-1").latest_message().unwrap().clone();
            assert_eq!(audit.role, InquiryActor::System);
            assert_eq!(audit.content, "강사 확인 필요");
            assert_eq!(audit.author, "이수진");
            assert_eq!(audit.visibility, Some(crate::inquiry::Visibility::Staff));
        }
    }

    mod remove_tests {
        use super::*;

        #[test]
        fn sole_message_is_kept() {
            let records = seed_inquiries();
            assert!(remove_message(&records, &"inq-1".into(), &"msg-1".into()).is_none());
        }

        #[test]
        fn unknown_message_changes_nothing() {
            let records = seed_inquiries();
            assert!(remove_message(&records, &"inq-4".into(), &"msg-99".into()).is_none());
        }

        #[test]
        fn removing_latest_resyncs_updated_at() {
            let records = seed_inquiries();
            let next = remove_message(&records, &"inq-4".into(), &"msg-4".into()).unwrap();

            let updated = record(&next, "inq-4");
            assert_eq!(updated.messages.len(), 3);
            assert_eq!(
                updated.updated_at,
                updated.latest_message().unwrap().created_at
            );
            assert_eq!(updated.status, InquiryStatus::RequesterConfirmed);
        }
    }
}
