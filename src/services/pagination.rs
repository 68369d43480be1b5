//! # 페이지 나누기
//!
//! 긴 목록을 번호 붙은 페이지로 나눕니다. 페이지 렌더러는 이 결과를 받아
//! 이전/다음/이동/취소 컨트롤을 붙여 보여주고, `PAGE_TIMEOUT_SECS` 동안
//! 입력이 없으면 컨트롤을 비활성화합니다.

use std::fmt::Display;

use crate::error::AppError;
use crate::models::{DisplayPayload, PageInfo, PageView, RichCard};

/// 사용자 입력 대기 시간(초)
pub const PAGE_TIMEOUT_SECS: u64 = 900;

/// 항목 목록과 페이지 크기
pub struct Paginator<T> {
    entries: Vec<T>,
    per_page: usize,
}

/// 한 페이지 분량
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1부터 시작하는 페이지 번호
    pub number: usize,
    pub total_pages: usize,
    pub total_entries: usize,
    /// `"{전체 기준 번호}. {항목}"` 형식의 줄
    pub lines: Vec<String>,
}

impl Page {
    /// 페이지가 둘 이상일 때만 `Page n/max (N entries)` 꼬리말을 붙입니다.
    pub fn footer(&self) -> Option<String> {
        (self.total_pages > 1).then(|| {
            format!(
                "Page {}/{} ({} entries)",
                self.number, self.total_pages, self.total_entries
            )
        })
    }
}

impl<T: Display> Paginator<T> {
    pub fn new(entries: Vec<T>, per_page: usize) -> Self {
        Self {
            entries,
            per_page: per_page.max(1),
        }
    }

    /// 전체 페이지 수. 항목이 없어도 1입니다.
    pub fn total_pages(&self) -> usize {
        self.entries.len().div_ceil(self.per_page).max(1)
    }

    /// `number`번째 페이지 (1부터). 범위를 벗어나면 `None`
    pub fn page(&self, number: usize) -> Option<Page> {
        if number == 0 || number > self.total_pages() {
            return None;
        }

        let start = (number - 1) * self.per_page;
        let lines = self
            .entries
            .iter()
            .enumerate()
            .skip(start)
            .take(self.per_page)
            .map(|(index, entry)| format!("{}. {}", index + 1, entry))
            .collect();

        Some(Page {
            number,
            total_pages: self.total_pages(),
            total_entries: self.entries.len(),
            lines,
        })
    }

    /// 요청한 페이지를 카드로 렌더링합니다.
    ///
    /// # 에러
    /// - `AppError::BadRequest`: 마지막 페이지를 넘는 번호
    pub fn render(&self, number: usize, title: &str) -> Result<PageView, AppError> {
        let page = self.page(number).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Page {} does not exist, there are only {} pages.",
                number,
                self.total_pages()
            ))
        })?;

        let mut card = RichCard::titled(title);
        card.description = Some(page.lines.join("\n"));
        card.footer = page.footer();

        Ok(PageView {
            payload: DisplayPayload::RichCard(card),
            pagination: Some(PageInfo {
                page: page.number,
                pages: page.total_pages,
                entries: page.total_entries,
                timeout_secs: PAGE_TIMEOUT_SECS,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("tag{}", i)).collect()
    }

    #[test]
    fn numbering_continues_across_pages() {
        let paginator = Paginator::new(entries(32), 15);
        assert_eq!(paginator.total_pages(), 3);

        let second = paginator.page(2).unwrap();
        assert_eq!(second.lines.first().map(String::as_str), Some("16. tag16"));
        assert_eq!(second.lines.len(), 15);
        assert_eq!(second.footer().as_deref(), Some("Page 2/3 (32 entries)"));

        let last = paginator.page(3).unwrap();
        assert_eq!(last.lines, vec!["31. tag31".to_string(), "32. tag32".to_string()]);
        assert!(paginator.page(4).is_none());
        assert!(paginator.page(0).is_none());
    }

    #[test]
    fn single_page_has_no_footer() {
        let paginator = Paginator::new(entries(3), 15);
        let page = paginator.page(1).unwrap();
        assert_eq!(page.footer(), None);
        assert_eq!(page.lines.len(), 3);
    }

    #[test]
    fn render_rejects_pages_past_the_end() {
        let paginator = Paginator::new(entries(3), 20);
        let view = paginator.render(1, "All Server Specific Tags").unwrap();
        let info = view.pagination.unwrap();
        assert_eq!((info.page, info.pages, info.entries), (1, 1, 3));
        assert_eq!(info.timeout_secs, PAGE_TIMEOUT_SECS);

        assert!(matches!(
            paginator.render(2, "All Server Specific Tags"),
            Err(AppError::BadRequest(_))
        ));
    }
}
