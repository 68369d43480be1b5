//! # 태그 모델 정의
//!
//! 태그(Tag)는 커뮤니티 멤버가 만든 "미리 준비된 답장"입니다.
//! 이름과 별칭(alias)으로 불러오고, 소유자가 있으며, 사용 횟수가 기록됩니다.
//!
//! ## 구조체 역할
//! - `Tag`: 메모리 상의 태그. 저장소에서 읽을 때 한 번 검증됩니다.
//! - `TagRow`: DB의 `tags` 테이블 한 행(row). 저장소의 원래 모양입니다.
//! - `TagOptions`: 커맨드 라우터가 파싱한 `{content?, url?, embed?, image?}` 옵션
//! - `TagEdit`: 검증을 마친 필드별 변경 내용 (`Keep` / `Clear` / `Set`)
//! - `CreateTagRequest`, `AliasRequest`, `TransferRequest`, `PruneRequest`: 요청 본문

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::display::{DisplayPayload, LinkButton, RichCard};

/// "내용 없음"을 나타내는 표시 문자 (zero-width no-break space)
pub const NO_CONTENT: &str = "\u{FEFF}";

/// DB에 저장하는 시각 형식
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// 이름/별칭 중복 검사에 쓰는 키. 유니코드 소문자로 접습니다 (`Über` == `über`).
pub fn fold_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// 태그 엔티티
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// 태그 고유 식별자 (UUIDv7 문자열), 생성 후 변하지 않음
    pub id: String,
    /// 태그 이름. 모든 이름과 별칭 사이에서 대소문자 무시 기준으로 유일합니다.
    pub name: String,
    /// 별칭 목록 (중복 없음, 등록 순서 유지)
    pub aliases: Vec<String>,
    /// 태그 내용. 비어 있으면 `NO_CONTENT`
    pub content: String,
    /// 소유자 멤버 ID. 없으면 "주인 없는" 태그입니다.
    pub owner_id: Option<String>,
    /// 표시용으로 조회된 횟수
    pub uses: i64,
    /// 생성 시각
    pub created: DateTime<Utc>,
    /// 리치 임베드로 보여줄지 여부. `image`가 있으면 항상 true
    pub embed: bool,
    /// 임베드 이미지 URL
    pub image: Option<String>,
    /// 링크 버튼 (라벨, URL)
    pub url: Option<TagLink>,
}

/// 태그에 붙는 링크 버튼
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagLink {
    pub label: String,
    pub url: String,
}

/// DB의 `tags` 테이블 한 행
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TagRow {
    pub id: String,
    pub name: String,
    pub content: String,
    pub owner_id: Option<String>,
    pub uses: i64,
    pub created: String,
    pub embed: bool,
    pub image: Option<String>,
    pub url_label: Option<String>,
    pub url_target: Option<String>,
}

impl Tag {
    /// 새 태그를 만듭니다. 사용 횟수는 0, 소유자는 `owner_id`입니다.
    pub fn new(name: impl Into<String>, owner_id: impl Into<String>, edit: &TagEdit) -> Self {
        let mut tag = Tag {
            id: uuid::Uuid::now_v7().to_string(),
            name: name.into(),
            aliases: Vec::new(),
            content: NO_CONTENT.to_string(),
            owner_id: Some(owner_id.into()),
            uses: 0,
            // DB에는 밀리초까지만 저장되므로 메모리 값도 맞춰 둡니다.
            created: Utc::now().trunc_subsecs(3),
            embed: false,
            image: None,
            url: None,
        };
        tag.apply_edit(edit);
        tag
    }

    /// DB 행과 별칭 목록으로 태그를 만듭니다.
    ///
    /// 저장된 값의 검증은 여기서 한 번만 합니다:
    /// - `created`는 RFC 3339 시각이어야 함
    /// - 링크 라벨과 URL은 둘 다 있거나 둘 다 없어야 함
    /// - `image`가 있으면 `embed`는 true로 맞춤
    pub fn from_row(row: TagRow, aliases: Vec<String>) -> Result<Self, AppError> {
        let created = DateTime::parse_from_rfc3339(&row.created)
            .map_err(|e| {
                AppError::Internal(format!("tag {} has an invalid created timestamp: {}", row.id, e))
            })?
            .with_timezone(&Utc);

        let url = match (row.url_label, row.url_target) {
            (Some(label), Some(url)) => Some(TagLink { label, url }),
            (None, None) => None,
            _ => {
                return Err(AppError::Internal(format!(
                    "tag {} has an incomplete url button",
                    row.id
                )))
            }
        };

        Ok(Tag {
            embed: row.embed || row.image.is_some(),
            id: row.id,
            name: row.name,
            aliases,
            content: row.content,
            owner_id: row.owner_id,
            uses: row.uses,
            created,
            image: row.image,
            url,
        })
    }

    /// 저장소의 행 모양으로 변환합니다. 별칭은 `tag_aliases` 테이블에 따로 저장됩니다.
    pub fn to_row(&self) -> TagRow {
        TagRow {
            id: self.id.clone(),
            name: self.name.clone(),
            content: self.content.clone(),
            owner_id: self.owner_id.clone(),
            uses: self.uses,
            created: self.created.format(TIMESTAMP_FORMAT).to_string(),
            embed: self.embed,
            image: self.image.clone(),
            url_label: self.url.as_ref().map(|link| link.label.clone()),
            url_target: self.url.as_ref().map(|link| link.url.clone()),
        }
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty() && self.content != NO_CONTENT
    }

    pub fn is_owned_by(&self, member_id: &str) -> bool {
        self.owner_id.as_deref() == Some(member_id)
    }

    /// 검증된 변경 내용을 적용합니다.
    ///
    /// 이미지를 설정하면 `embed`는 항상 true가 됩니다.
    /// 이미지를 지워도 `embed`는 마지막으로 지정된 값을 유지합니다.
    pub fn apply_edit(&mut self, edit: &TagEdit) {
        match &edit.content {
            FieldEdit::Keep => {}
            FieldEdit::Clear => self.content = NO_CONTENT.to_string(),
            FieldEdit::Set(content) => self.content = content.clone(),
        }

        match &edit.url {
            FieldEdit::Keep => {}
            FieldEdit::Clear => self.url = None,
            FieldEdit::Set(link) => self.url = Some(link.clone()),
        }

        match &edit.image {
            FieldEdit::Keep => {}
            FieldEdit::Clear => self.image = None,
            FieldEdit::Set(image) => {
                self.image = Some(image.clone());
                self.embed = true;
            }
        }

        if let Some(embed) = edit.embed {
            self.embed = embed || self.image.is_some();
        }
    }

    fn button(&self) -> Option<LinkButton> {
        self.url.as_ref().map(|link| LinkButton {
            label: link.label.clone(),
            url: link.url.clone(),
        })
    }

    /// 채팅에 보낼 태그 메시지. `embed`에 따라 텍스트 또는 카드가 됩니다.
    pub fn to_display(&self) -> DisplayPayload {
        if self.embed {
            DisplayPayload::RichCard(RichCard {
                description: self.has_content().then(|| self.content.clone()),
                image: self.image.clone(),
                button: self.button(),
                ..RichCard::default()
            })
        } else {
            DisplayPayload::PlainText {
                content: self.content.clone(),
                button: self.button(),
            }
        }
    }

    /// `tag info` 카드: 소유자, 사용 횟수, 생성 시각, 별칭
    pub fn to_info_card(&self) -> DisplayPayload {
        let owner = match &self.owner_id {
            Some(id) => format!("<@{}>", id),
            None => "Unclaimed".to_string(),
        };
        let aliases = if self.aliases.is_empty() {
            "None".to_string()
        } else {
            self.aliases.join(", ")
        };

        let mut card = RichCard::titled(self.name.clone())
            .field("Owner", owner, true)
            .field("Uses", self.uses.to_string(), true)
            .field("Created", self.created.format("%a %d %B %Y at %H:%M UTC").to_string(), true)
            .field("Aliases", aliases, false);
        card.footer = Some(format!("Tag ID: {}", self.id));
        DisplayPayload::RichCard(card)
    }

    /// `tag raw` 답장: 마크다운을 이스케이프한 내용과 설정 요약
    pub fn to_raw(&self) -> DisplayPayload {
        let mut info = String::from("```\nInformation about the tag:\n");

        let content = if self.has_content() {
            escape_markdown(&self.content)
        } else {
            info.push_str("• The tag has no content\n");
            self.content.clone()
        };

        if let Some(link) = &self.url {
            info.push_str(&format!(
                "• The tag has the button: {} that points to {}\n",
                link.label, link.url
            ));
        }
        if let Some(image) = &self.image {
            info.push_str(&format!("• The tag has the embed image as: {}\n", image));
        }
        let embedded = if self.embed { "is" } else { "is not" };
        info.push_str(&format!("• The tag {} embedded.\n```", embedded));

        DisplayPayload::text(format!("{}\n{}", content, info))
    }
}

/// 채팅 마크다운 특수문자 앞에 역슬래시를 붙입니다.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '*' | '_' | '~' | '`' | '|' | '>') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// 커맨드 라우터가 보내는 태그 옵션
///
/// 모든 값은 채팅에 입력된 문자열 그대로입니다. 검증은 `TagEdit`에서 합니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagOptions {
    pub content: Option<String>,
    /// `"라벨, URL"` 형식
    pub url: Option<String>,
    /// `"true"` 또는 `"false"`
    pub embed: Option<String>,
    pub image: Option<String>,
}

/// 필드 하나에 대한 변경
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> Default for FieldEdit<T> {
    fn default() -> Self {
        FieldEdit::Keep
    }
}

/// 검증을 마친 태그 변경 내용
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagEdit {
    pub content: FieldEdit<String>,
    pub url: FieldEdit<TagLink>,
    pub embed: Option<bool>,
    pub image: FieldEdit<String>,
}

impl TagEdit {
    /// `tag create` 옵션 검증. url/image에 `none`은 허용하지 않습니다.
    pub fn for_create(options: &TagOptions) -> Result<Self, AppError> {
        Self::parse(options, false)
    }

    /// `tag edit` 옵션 검증. `none`(대소문자 무시)은 해당 필드를 지웁니다.
    pub fn for_update(options: &TagOptions) -> Result<Self, AppError> {
        Self::parse(options, true)
    }

    fn parse(options: &TagOptions, allow_clear: bool) -> Result<Self, AppError> {
        // 내용은 들여쓰기와 줄바꿈을 그대로 저장합니다. 공백 제거는 판별에만 씁니다.
        let content = match (supplied(&options.content), options.content.as_deref()) {
            (Some(value), _) if is_none_keyword(value) => FieldEdit::Clear,
            (Some(_), Some(raw)) => FieldEdit::Set(raw.to_string()),
            _ => FieldEdit::Keep,
        };

        let url = match supplied(&options.url) {
            None => FieldEdit::Keep,
            Some(value) if allow_clear && is_none_keyword(value) => FieldEdit::Clear,
            Some(value) => FieldEdit::Set(parse_link(value)?),
        };

        let embed = match supplied(&options.embed) {
            None => None,
            Some(value) if value.eq_ignore_ascii_case("true") => Some(true),
            Some(value) if value.eq_ignore_ascii_case("false") => Some(false),
            Some(_) => {
                return Err(AppError::MalformedOption(
                    "Invalid options provided. Valid options are: `true` and `false`".to_string(),
                ))
            }
        };

        let image = match supplied(&options.image) {
            None => FieldEdit::Keep,
            Some(value) if allow_clear && is_none_keyword(value) => FieldEdit::Clear,
            Some(value) if value.starts_with("http") => FieldEdit::Set(value.to_string()),
            Some(_) => {
                return Err(AppError::MalformedOption(
                    "Invalid URL was provided, please provide an URL that starts with http(s)."
                        .to_string(),
                ))
            }
        };

        Ok(TagEdit {
            content,
            url,
            embed,
            image,
        })
    }
}

/// 빈 문자열은 "입력하지 않음"으로 취급합니다.
fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn is_none_keyword(value: &str) -> bool {
    value.eq_ignore_ascii_case("none")
}

/// `"라벨, URL"`을 파싱합니다. 쉼표는 정확히 하나여야 합니다.
fn parse_link(raw: &str) -> Result<TagLink, AppError> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [label, url] if !label.is_empty() && url.starts_with("http") => Ok(TagLink {
            label: label.to_string(),
            url: url.to_string(),
        }),
        [_, _] => Err(AppError::MalformedOption(
            "The url option needs a label and an URL that starts with http(s), like `Website, https://example.com`."
                .to_string(),
        )),
        [_] => Err(AppError::MalformedOption(
            "Expected a label and an URL separated by a comma (`,`).".to_string(),
        )),
        _ => Err(AppError::MalformedOption(
            "Got multiple commas (`,`), expected only one.".to_string(),
        )),
    }
}

/// 태그 생성 요청: `POST /api/v1/tags`
#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    #[serde(flatten)]
    pub options: TagOptions,
}

/// 별칭 추가/삭제 요청: `POST /api/v1/tags/{name}/aliases`
///
/// 각 값은 쉼표로 구분된 목록입니다 (예: `"hello, hi"`).
#[derive(Debug, Default, Deserialize)]
pub struct AliasRequest {
    pub add: Option<String>,
    pub remove: Option<String>,
}

/// 소유권 이전 요청: `POST /api/v1/tags/{name}/transfer`
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub member_id: String,
    /// 답장에 쓸 표시 이름. 없으면 멘션 형식을 씁니다.
    pub member_name: Option<String>,
}

/// 정리 요청: `POST /api/v1/tags/prune`
#[derive(Debug, Default, Deserialize)]
pub struct PruneRequest {
    /// 이 값 이하로 사용된 태그를 삭제합니다 (기본값 0)
    #[serde(default)]
    pub uses: i64,
}
