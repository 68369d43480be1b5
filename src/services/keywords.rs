//! # 태그 명령어 예약어
//!
//! `tag` 명령 그룹의 하위 명령 이름과 그 별칭 목록입니다.
//! 태그 이름이나 별칭이 이 단어들과 같으면(대소문자 무시) 하위 명령을 가리게 되므로
//! 생성/별칭 추가 시 거부합니다.

use crate::models::fold_key;

/// 명령 그룹 이름
pub const TAG_GROUP: &str = "tag";

/// `tag list`의 최상위 별칭 명령
pub const TAGS_SHORTCUT: &str = "tags";

/// 하위 명령 하나
pub struct Subcommand {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
}

/// `tag` 그룹의 하위 명령 목록
pub const TAG_SUBCOMMANDS: &[Subcommand] = &[
    Subcommand { name: "info", aliases: &[] },
    Subcommand { name: "delete", aliases: &[] },
    Subcommand { name: "create", aliases: &[] },
    Subcommand { name: "edit", aliases: &[] },
    Subcommand { name: "raw", aliases: &[] },
    Subcommand { name: "search", aliases: &[] },
    Subcommand { name: "list", aliases: &[] },
    Subcommand { name: "all", aliases: &[] },
    Subcommand { name: "transfer", aliases: &[] },
    Subcommand { name: "claim", aliases: &[] },
    Subcommand { name: "alias", aliases: &[] },
    Subcommand { name: "prune", aliases: &[] },
    Subcommand { name: "id", aliases: &[] },
];

/// 후보 이름이 예약어인지 확인합니다 (대소문자 무시).
pub fn is_reserved(candidate: &str) -> bool {
    let folded = fold_key(candidate);

    folded == TAG_GROUP
        || folded == TAGS_SHORTCUT
        || TAG_SUBCOMMANDS.iter().any(|cmd| {
            folded == cmd.name || cmd.aliases.iter().any(|alias| folded == alias.to_lowercase())
        })
}
