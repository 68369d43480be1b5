use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::display::{DisplayPayload, RichCard};

const DATE_FORMAT: &str = "%a %d, %B of %Y at %H:%M%p";
const AVATAR_RENDER_URL: &str = "http://www.roblox.com/Thumbs/Avatar.ashx?x=420&y=420&Format=Png&userId=";

/// Member details the command router already holds for `userinfo`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfoRequest {
    pub member_id: String,
    pub display_name: String,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    /// `None` when the user is not a member of the server.
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub is_staff: bool,
    pub avatar_url: Option<String>,
}

impl UserInfoRequest {
    pub fn to_card(&self, linked_id: Option<u64>) -> DisplayPayload {
        let status = match self.status.as_deref() {
            Some("online") => "`Online`",
            Some("offline") => "`Offline`",
            Some("dnd") => "`Do Not Disturb`",
            Some("idle") => "`Idle`",
            _ => "`Cannot find status in DMs`",
        };

        let mut card = RichCard::titled("User Information").field(
            "General Info",
            format!(
                "Name: `{}`\nStatus: {}\nCreated at: `{}`",
                self.display_name,
                status,
                self.created_at.format(DATE_FORMAT)
            ),
            false,
        );

        if let Some(joined_at) = self.joined_at {
            let roles = if self.roles.is_empty() {
                "None".to_string()
            } else {
                self.roles.join(" ")
            };
            card = card.field(
                "Server Related",
                format!(
                    "Joined us at: `{}`\nRoles: {}\nStaff: `{}`",
                    joined_at.format(DATE_FORMAT),
                    roles,
                    self.is_staff
                ),
                false,
            );
        }

        card.thumbnail = match linked_id {
            Some(id) => Some(format!("{}{}", AVATAR_RENDER_URL, id)),
            None => self.avatar_url.clone(),
        };
        card.footer = Some(format!("ID: {}", self.member_id));

        DisplayPayload::RichCard(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(joined: bool) -> UserInfoRequest {
        UserInfoRequest {
            member_id: "42".into(),
            display_name: "alice#0001".into(),
            status: Some("dnd".into()),
            created_at: Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap(),
            joined_at: joined.then(|| Utc.with_ymd_and_hms(2021, 6, 7, 8, 9, 10).unwrap()),
            roles: vec![],
            is_staff: false,
            avatar_url: Some("https://cdn/avatar.png".into()),
        }
    }

    #[test]
    fn linked_identity_sets_render_thumbnail() {
        let DisplayPayload::RichCard(card) = request(true).to_card(Some(7)) else {
            panic!("expected a rich card");
        };
        assert_eq!(card.thumbnail.as_deref(), Some("http://www.roblox.com/Thumbs/Avatar.ashx?x=420&y=420&Format=Png&userId=7"));
        assert_eq!(card.fields.len(), 2);
        assert!(card.fields[0].value.contains("`Do Not Disturb`"));
        assert!(card.fields[1].value.contains("Roles: None"));
    }

    #[test]
    fn unlinked_non_member_falls_back_to_avatar() {
        let DisplayPayload::RichCard(card) = request(false).to_card(None) else {
            panic!("expected a rich card");
        };
        assert_eq!(card.thumbnail.as_deref(), Some("https://cdn/avatar.png"));
        assert_eq!(card.fields.len(), 1);
    }
}
