//! Demo dataset the store starts from when nothing is cached.

use chrono::{DateTime, Utc};

use super::model::{
    AssistantRef, AttachmentKind, InquiryActor, InquiryAttachment, InquiryId, InquiryMessage,
    InquiryRecord, InquiryStatus, InstructorRef, MessageId, MessageKind, ParentRef, StatusChange,
    StudentRef, Visibility,
};

/// Fixed seed timestamps are written as RFC 3339 literals.
fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .map_or(DateTime::UNIX_EPOCH, |t| t.with_timezone(&Utc))
}

fn student(name: &str, student_id: &str, grade: &str) -> StudentRef {
    StudentRef {
        name: name.to_string(),
        student_id: student_id.to_string(),
        grade: Some(grade.to_string()),
    }
}

fn instructor(name: &str) -> InstructorRef {
    InstructorRef {
        name: name.to_string(),
        avatar_url: None,
    }
}

fn assistant(name: &str, initials: &str) -> AssistantRef {
    AssistantRef {
        name: name.to_string(),
        initials: initials.to_string(),
    }
}

fn parent(name: &str) -> ParentRef {
    ParentRef {
        name: name.to_string(),
    }
}

struct SeedMessage<'a> {
    role: InquiryActor,
    author: &'a str,
    content: &'a str,
    at: &'a str,
    visibility: Option<Visibility>,
    changes_status: Option<(InquiryStatus, InquiryStatus)>,
    attachments: Vec<InquiryAttachment>,
}

fn msg<'a>(role: InquiryActor, author: &'a str, content: &'a str, at: &'a str) -> SeedMessage<'a> {
    SeedMessage {
        role,
        author,
        content,
        at,
        visibility: None,
        changes_status: None,
        attachments: Vec::new(),
    }
}

impl SeedMessage<'_> {
    fn staff_only(mut self) -> Self {
        self.visibility = Some(Visibility::Staff);
        self
    }

    fn moving(mut self, from: InquiryStatus, to: InquiryStatus) -> Self {
        self.changes_status = Some((from, to));
        self
    }

    fn with_attachment(mut self, attachment: InquiryAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

struct SeedRecord<'a> {
    id: &'a str,
    title: &'a str,
    category: &'a str,
    status: InquiryStatus,
    student: StudentRef,
    parent: Option<ParentRef>,
    instructor: InstructorRef,
    assistant: Option<AssistantRef>,
    messages: Vec<SeedMessage<'a>>,
}

impl SeedRecord<'_> {
    fn build(self) -> InquiryRecord {
        let messages: Vec<InquiryMessage> = self
            .messages
            .into_iter()
            .enumerate()
            .map(|(i, m)| InquiryMessage {
                id: MessageId::new(format!("msg-{}", i + 1)),
                role: m.role,
                author: m.author.to_string(),
                content: m.content.to_string(),
                created_at: at(m.at),
                attachments: m.attachments,
                visibility: m.visibility,
                kind: Some(if i == 0 {
                    MessageKind::Initial
                } else {
                    MessageKind::Message
                }),
                changes_status: m.changes_status.map(|(from, to)| StatusChange { from, to }),
            })
            .collect();

        let created_at = messages.first().map_or(DateTime::UNIX_EPOCH, |m| m.created_at);
        let updated_at = messages.last().map_or(created_at, |m| m.created_at);

        InquiryRecord {
            id: InquiryId::new(self.id),
            title: self.title.to_string(),
            category: self.category.to_string(),
            status: self.status,
            created_at,
            updated_at,
            student: self.student,
            parent: self.parent,
            instructor: self.instructor,
            assistant: self.assistant,
            messages,
        }
    }
}

fn attachment(id: &str, label: &str, kind: AttachmentKind, size: &str) -> InquiryAttachment {
    InquiryAttachment {
        url: Some(format!("/files/{label}")),
        size: Some(size.to_string()),
        kind: Some(kind),
        ..InquiryAttachment::new(id, label)
    }
}

/// Identity template new inquiries copy their people from: the first
/// record of [`seed_inquiries`].
#[must_use]
pub(crate) fn template_record() -> InquiryRecord {
    use InquiryActor::Student;

    SeedRecord {
        id: "inq-1",
        title: "수학 과제 3번 풀이 질문",
        category: "학습",
        status: InquiryStatus::AssistantRouted,
        student: student("김민준", "S-2024-031", "중2"),
        parent: Some(parent("김영희")),
        instructor: instructor("박지훈"),
        assistant: Some(assistant("이수진", "SJ")),
        messages: vec![
            msg(Student, "김민준", "3번 문제에서 이차방정식 근의 공식을 쓰는 이유를 모르겠어요.", "2025-03-14T09:12:00Z")
                .with_attachment(attachment("att-1", "homework-3.jpg", AttachmentKind::Image, "1.2MB")),
        ],
    }
    .build()
}

/// The demo dataset, most recently created first.
///
/// The first record doubles as the identity template for
/// [`crate::InquiryStore::create_inquiry`].
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn seed_inquiries() -> Vec<InquiryRecord> {
    use InquiryActor::{Assistant, Instructor, Parent, Student, System};
    use InquiryStatus::{Answered, AssistantRouted, Closed, InstructorReview, RequesterConfirmed};

    let records = vec![
        SeedRecord {
            id: "inq-2",
            title: "보강 일정 변경 요청",
            category: "일정",
            status: InstructorReview,
            student: student("이서연", "S-2024-017", "고1"),
            parent: Some(parent("이정호")),
            instructor: instructor("최유나"),
            assistant: Some(assistant("정다은", "DE")),
            messages: vec![
                msg(Parent, "이정호", "다음 주 목요일 보강을 금요일로 옮길 수 있을까요?", "2025-03-13T11:00:00Z"),
                msg(Assistant, "정다은", "강사님께 확인 후 안내드리겠습니다.", "2025-03-13T13:20:00Z"),
                msg(System, "시스템", "상태가 '조교 이관'에서 '강사 검토'(으)로 변경되었습니다.", "2025-03-13T13:21:00Z")
                    .moving(AssistantRouted, InstructorReview),
            ],
        },
        SeedRecord {
            id: "inq-3",
            title: "모의고사 성적표 재발급",
            category: "성적",
            status: Answered,
            student: student("박지호", "S-2023-088", "고2"),
            parent: None,
            instructor: instructor("박지훈"),
            assistant: None,
            messages: vec![
                msg(Student, "박지호", "2월 모의고사 성적표를 잃어버렸어요. 다시 받을 수 있나요?", "2025-03-11T08:45:00Z"),
                msg(Instructor, "박지훈", "데스크에서 재발급 가능합니다. 파일도 첨부합니다.", "2025-03-11T10:02:00Z")
                    .with_attachment(attachment("att-2", "mock-exam-feb.pdf", AttachmentKind::File, "480KB"))
                    .moving(AssistantRouted, Answered),
            ],
        },
        SeedRecord {
            id: "inq-4",
            title: "영어 듣기 자료 재생 오류",
            category: "자료",
            status: RequesterConfirmed,
            student: student("최예린", "S-2024-052", "중3"),
            parent: Some(parent("최성민")),
            instructor: instructor("한가람"),
            assistant: Some(assistant("이수진", "SJ")),
            messages: vec![
                msg(Student, "최예린", "4강 듣기 파일이 재생되지 않아요.", "2025-03-09T19:30:00Z"),
                msg(Assistant, "이수진", "파일 인코딩 문제로 보입니다. 강사님께 전달했습니다.", "2025-03-10T09:05:00Z")
                    .staff_only(),
                msg(Instructor, "한가람", "새 파일로 교체했습니다. 다시 확인해 주세요.", "2025-03-10T14:40:00Z")
                    .with_attachment(InquiryAttachment {
                        embed_url: Some("https://video.academy.example/embed/listening-4".to_string()),
                        kind: Some(AttachmentKind::Video),
                        ..InquiryAttachment::new("att-3", "listening-4.mp4")
                    })
                    .moving(AssistantRouted, Answered),
                msg(Student, "최예린", "잘 나와요. 감사합니다!", "2025-03-10T20:15:00Z")
                    .moving(Answered, RequesterConfirmed),
            ],
        },
        SeedRecord {
            id: "inq-5",
            title: "수강료 분할 납부 문의",
            category: "결제",
            status: Closed,
            student: student("정하준", "S-2022-140", "고3"),
            parent: Some(parent("정미경")),
            instructor: instructor("최유나"),
            assistant: None,
            messages: vec![
                msg(Parent, "정미경", "이번 학기 수강료를 두 번에 나눠 낼 수 있을까요?", "2025-03-02T10:00:00Z"),
                msg(Instructor, "최유나", "가능합니다. 행정실에서 안내 문자를 보내드릴게요.", "2025-03-02T15:30:00Z")
                    .moving(AssistantRouted, Answered),
                msg(System, "시스템", "상태가 '답변 완료'에서 '종료'(으)로 변경되었습니다.", "2025-03-05T09:00:00Z")
                    .moving(Answered, Closed),
            ],
        },
        SeedRecord {
            id: "inq-6",
            title: "과학 실험 보고서 제출 기한",
            category: "학습",
            status: AssistantRouted,
            student: student("윤서아", "S-2024-066", "중1"),
            parent: None,
            instructor: instructor("한가람"),
            assistant: Some(assistant("정다은", "DE")),
            messages: vec![
                msg(Student, "윤서아", "실험 보고서 제출이 이번 주 금요일까지인가요?", "2025-02-27T16:10:00Z"),
            ],
        },
        SeedRecord {
            id: "inq-7",
            title: "셔틀버스 탑승 위치 변경",
            category: "일정",
            status: Answered,
            student: student("강도윤", "S-2023-023", "중2"),
            parent: Some(parent("강은지")),
            instructor: instructor("박지훈"),
            assistant: Some(assistant("이수진", "SJ")),
            messages: vec![
                msg(Parent, "강은지", "이사해서 셔틀 탑승 위치를 바꾸고 싶습니다.", "2025-02-24T08:00:00Z"),
                msg(Assistant, "이수진", "새 정류장 위치를 알려주시면 반영하겠습니다.", "2025-02-24T09:30:00Z")
                    .moving(AssistantRouted, Answered),
            ],
        },
        SeedRecord {
            id: "inq-8",
            title: "결석 사유서 제출",
            category: "출결",
            status: Closed,
            student: student("임지우", "S-2024-009", "고1"),
            parent: Some(parent("임상훈")),
            instructor: instructor("최유나"),
            assistant: None,
            messages: vec![
                msg(Parent, "임상훈", "병원 진료로 결석했습니다. 진단서 첨부합니다.", "2025-02-20T07:50:00Z")
                    .with_attachment(attachment("att-4", "diagnosis.pdf", AttachmentKind::File, "210KB")),
                msg(Instructor, "최유나", "확인했습니다. 출결에 반영했습니다.", "2025-02-20T12:00:00Z")
                    .moving(AssistantRouted, Answered),
                msg(System, "시스템", "상태가 '답변 완료'에서 '종료'(으)로 변경되었습니다.", "2025-02-21T09:00:00Z")
                    .moving(Answered, Closed),
            ],
        },
    ];

    std::iter::once(template_record())
        .chain(records.into_iter().map(SeedRecord::build))
        .collect()
}
