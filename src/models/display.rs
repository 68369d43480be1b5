//! # 표시(Display) 페이로드 모델
//!
//! 핸들러가 커맨드 라우터에 돌려주는 "채팅에 보낼 메시지"의 모양입니다.
//! 라우터는 이 값을 받아 일반 텍스트 메시지나 리치 임베드 카드로 렌더링합니다.
//!
//! JSON 표현:
//! - `{ "kind": "plain_text", "content": "...", "button": null }`
//! - `{ "kind": "rich_card", "title": "...", "fields": [...], ... }`

use serde::{Deserialize, Serialize};

/// 채팅에 보낼 메시지 한 개
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayPayload {
    /// 일반 텍스트 메시지
    PlainText {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        button: Option<LinkButton>,
    },
    /// 리치 임베드 카드
    RichCard(RichCard),
}

impl DisplayPayload {
    /// 버튼 없는 일반 텍스트 답장
    pub fn text(content: impl Into<String>) -> Self {
        DisplayPayload::PlainText {
            content: content.into(),
            button: None,
        }
    }
}

/// 리치 임베드 카드
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RichCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<CardAuthor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<CardField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button: Option<LinkButton>,
}

impl RichCard {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// 필드를 하나 추가합니다. `inline`이 false면 한 줄을 통째로 씁니다.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(CardField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }
}

/// 카드 맨 위에 표시되는 작성자 줄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardAuthor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// 카드 안의 이름/값 필드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// 메시지에 붙는 링크 버튼 (라벨, URL)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

/// 페이지 단위로 나뉜 목록 응답
///
/// 결과가 없을 때는 `pagination` 없이 일반 텍스트 답장만 담깁니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView {
    pub payload: DisplayPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
}

/// 페이지 렌더러가 이동 버튼을 그리는 데 필요한 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 현재 페이지 (1부터 시작)
    pub page: usize,
    /// 전체 페이지 수
    pub pages: usize,
    /// 전체 항목 수
    pub entries: usize,
    /// 사용자 입력을 기다리는 최대 시간(초). 지나면 컨트롤을 비활성화합니다.
    pub timeout_secs: u64,
}
