//! Member directory: every account in the workspace via `users.list`.

use serde::Deserialize;

use crate::collect::retry::RetryPolicy;
use crate::error::{Error, Result};
use crate::model::Member;

use super::ResponseMetadata;

const USERS_PAGE_SIZE: u32 = 200;

#[derive(Debug, Deserialize)]
struct UsersListBody {
    #[serde(default)]
    members: Vec<RawUser>,
    #[serde(default)]
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    is_bot: bool,
    #[serde(default)]
    profile: RawProfile,
}

#[derive(Debug, Default, Deserialize)]
struct RawProfile {
    #[serde(default)]
    real_name: String,
    #[serde(default)]
    display_name: String,
}

impl RawUser {
    /// Bots, deactivated accounts and Slackbot.
    fn is_inactive(&self) -> bool {
        self.deleted || self.is_bot || self.id == "USLACKBOT"
    }

    fn into_member(self) -> Member {
        let display_name = [
            self.profile.real_name,
            self.profile.display_name,
            self.name,
        ]
        .into_iter()
        .map(|n| n.trim().to_string())
        .find(|n| !n.is_empty())
        .unwrap_or_else(|| self.id.clone());
        Member::new(self.id, display_name)
    }
}

impl super::SlackClient {
    /// List every workspace member, following `users.list` pagination.
    ///
    /// With `skip_inactive`, bots and deactivated accounts are left out.
    /// Unlike a reactions page, a members page that keeps failing is an
    /// error: a silently short member list would drop whole users.
    pub async fn list_members(
        &self,
        policy: &RetryPolicy,
        skip_inactive: bool,
    ) -> Result<Vec<Member>> {
        let mut members = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("limit", USERS_PAGE_SIZE.to_string())];
            if let Some(ref c) = cursor {
                query.push(("cursor", c.clone()));
            }

            let body: UsersListBody = policy
                .call("users.list", || self.call("users.list", &query))
                .await?
                .ok_or_else(|| Error::Other("users.list kept failing; giving up".to_string()))?;

            members.extend(
                body.members
                    .into_iter()
                    .filter(|u| !(skip_inactive && u.is_inactive()))
                    .map(RawUser::into_member),
            );
            tracing::debug!(count = members.len(), "listed members page");

            match body.response_metadata.next_cursor.filter(|c| !c.is_empty()) {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::info!(count = members.len(), "listed workspace members");
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(value: serde_json::Value) -> RawUser {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn prefers_real_name() {
        let m = user(json!({
            "id": "U1", "name": "ada",
            "profile": {"real_name": "Ada Lovelace", "display_name": "ada.l"}
        }))
        .into_member();
        assert_eq!(m, Member::new("U1", "Ada Lovelace"));
    }

    #[test]
    fn falls_back_to_handle_then_id() {
        let m = user(json!({"id": "U2", "name": "grace", "profile": {}})).into_member();
        assert_eq!(m.display_name, "grace");

        let m = user(json!({"id": "U3"})).into_member();
        assert_eq!(m.display_name, "U3");
    }

    #[test]
    fn bots_and_deleted_are_inactive() {
        assert!(user(json!({"id": "B1", "is_bot": true})).is_inactive());
        assert!(user(json!({"id": "U4", "deleted": true})).is_inactive());
        assert!(user(json!({"id": "USLACKBOT"})).is_inactive());
        assert!(!user(json!({"id": "U5"})).is_inactive());
    }
}
