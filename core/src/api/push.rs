//! Push rule management.

use serde::Serialize;
use serde_json::Value;

use super::{finish, to_json, Api};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest};
use crate::path::{build_client_path, Query};
use crate::push::{PushAction, PushCondition};
use crate::types::PushRuleKind;

/// Settings for `build_set_pushrule`.
///
/// `before` and `after` are mutually exclusive. `pattern` is only valid for
/// `content` rules and `conditions` only for `override` and `underride`
/// rules; `Some(vec![])` still counts as given.
#[derive(Debug, Clone, Default)]
pub struct PushRuleOptions {
    pub before: Option<String>,
    pub after: Option<String>,
    pub actions: Vec<PushAction>,
    pub conditions: Option<Vec<PushCondition>>,
    pub pattern: Option<String>,
}

#[derive(Serialize)]
struct PushRuleBody<'a> {
    actions: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pattern: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    conditions: Option<Vec<Value>>,
}

fn rule_path(scope: &str, kind: PushRuleKind, rule_id: &str, leaf: Option<&str>, query: Option<&Query>) -> String {
    let mut segments = vec!["pushrules", scope, kind.as_str(), rule_id];
    segments.extend(leaf);
    build_client_path(segments, query)
}

fn action_values(actions: &[PushAction]) -> Vec<Value> {
    actions.iter().map(PushAction::as_value).collect()
}

impl Api {
    /// Create or replace a user-defined push rule.
    pub fn build_set_pushrule(
        &self,
        access_token: &str,
        scope: &str,
        kind: PushRuleKind,
        rule_id: &str,
        opts: &PushRuleOptions,
    ) -> Result<HttpRequest, ApiError> {
        let query = match (&opts.before, &opts.after) {
            (Some(before), Some(after)) => {
                return Err(ApiError::ConflictingPosition {
                    before: before.clone(),
                    after: after.clone(),
                })
            }
            (Some(before), None) => Query::new().with("before", before.as_str()),
            (None, Some(after)) => Query::new().with("after", after.as_str()),
            (None, None) => Query::new(),
        };

        if opts.pattern.is_some() && kind != PushRuleKind::Content {
            return Err(ApiError::PatternNotAllowed { kind });
        }
        if opts.conditions.is_some() && !matches!(kind, PushRuleKind::Override | PushRuleKind::Underride) {
            return Err(ApiError::ConditionsNotAllowed { kind });
        }

        let body = PushRuleBody {
            actions: action_values(&opts.actions),
            pattern: opts.pattern.as_deref(),
            conditions: opts
                .conditions
                .as_ref()
                .map(|conds| conds.iter().map(PushCondition::as_value).collect()),
        };
        let req = HttpRequest::new(HttpMethod::Put, rule_path(scope, kind, rule_id, None, Some(&query)))
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }

    pub fn build_delete_pushrule(
        &self,
        access_token: &str,
        scope: &str,
        kind: PushRuleKind,
        rule_id: &str,
    ) -> HttpRequest {
        let path = rule_path(scope, kind, rule_id, None, None);
        finish(HttpRequest::new(HttpMethod::Delete, path).bearer(access_token))
    }

    /// Enable or disable a rule. Works for server-default rules too.
    pub fn build_enable_pushrule(
        &self,
        access_token: &str,
        scope: &str,
        kind: PushRuleKind,
        rule_id: &str,
        enable: bool,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::json!({ "enabled": enable });
        let req = HttpRequest::new(HttpMethod::Put, rule_path(scope, kind, rule_id, Some("enabled"), None))
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }

    /// Replace the actions of a rule. Works for server-default rules too.
    pub fn build_set_pushrule_actions(
        &self,
        access_token: &str,
        scope: &str,
        kind: PushRuleKind,
        rule_id: &str,
        actions: &[PushAction],
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::json!({ "actions": action_values(actions) });
        let req = HttpRequest::new(HttpMethod::Put, rule_path(scope, kind, rule_id, Some("actions"), None))
            .bearer(access_token)
            .body(to_json(&body)?);
        Ok(finish(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{assert_authed, body_json, TOKEN};
    use serde_json::json;

    #[test]
    fn before_and_after_conflict() {
        let opts = PushRuleOptions {
            before: Some("rule1".into()),
            after: Some("rule2".into()),
            ..Default::default()
        };
        let err = Api::new()
            .build_set_pushrule(TOKEN, "global", PushRuleKind::Override, "r", &opts)
            .unwrap_err();
        assert!(matches!(err, ApiError::ConflictingPosition { .. }));
    }

    #[test]
    fn pattern_only_for_content_rules() {
        let opts = PushRuleOptions {
            pattern: Some("x".into()),
            ..Default::default()
        };
        let api = Api::new();
        let err = api
            .build_set_pushrule(TOKEN, "global", PushRuleKind::Room, "!r:x", &opts)
            .unwrap_err();
        assert!(matches!(err, ApiError::PatternNotAllowed { kind: PushRuleKind::Room }));

        let req = api
            .build_set_pushrule(TOKEN, "global", PushRuleKind::Content, "cake", &opts)
            .unwrap();
        assert_eq!(req.body.as_deref(), Some(r#"{"actions":[],"pattern":"x"}"#));
    }

    #[test]
    fn conditions_only_for_override_and_underride() {
        let opts = PushRuleOptions {
            conditions: Some(vec![]),
            ..Default::default()
        };
        let api = Api::new();
        for kind in [PushRuleKind::Content, PushRuleKind::Room, PushRuleKind::Sender] {
            let err = api.build_set_pushrule(TOKEN, "global", kind, "r", &opts).unwrap_err();
            assert!(matches!(err, ApiError::ConditionsNotAllowed { .. }));
        }
        for kind in [PushRuleKind::Override, PushRuleKind::Underride] {
            assert!(api.build_set_pushrule(TOKEN, "global", kind, "r", &opts).is_ok());
        }
    }

    #[test]
    fn full_rule_body_and_position() {
        let opts = PushRuleOptions {
            after: Some(".m.rule.master".into()),
            actions: vec![PushAction::Notify, PushAction::sound("default"), PushAction::highlight(true)],
            conditions: Some(vec![
                PushCondition::EventMatch {
                    key: "content.body".into(),
                    pattern: "*cake*".into(),
                },
                PushCondition::RoomMemberCount { is: "<=2".into() },
            ]),
            ..Default::default()
        };
        let req = Api::new()
            .build_set_pushrule(TOKEN, "global", PushRuleKind::Override, "cake rule", &opts)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(
            req.path,
            "/_matrix/client/v3/pushrules/global/override/cake%20rule?after=.m.rule.master"
        );
        assert_eq!(
            body_json(&req),
            json!({
                "actions": [
                    "notify",
                    {"set_tweak": "sound", "value": "default"},
                    {"set_tweak": "highlight", "value": true}
                ],
                "conditions": [
                    {"kind": "event_match", "key": "content.body", "pattern": "*cake*"},
                    {"kind": "room_member_count", "is": "<=2"}
                ]
            })
        );
        assert_authed(&req);
    }

    #[test]
    fn rule_toggles_and_actions() {
        let api = Api::new();
        let delete = api.build_delete_pushrule(TOKEN, "global", PushRuleKind::Sender, "@a:x");
        assert_eq!(delete.method, HttpMethod::Delete);
        assert_eq!(delete.path, "/_matrix/client/v3/pushrules/global/sender/%40a%3Ax");
        assert!(delete.body.is_none());

        let enable = api
            .build_enable_pushrule(TOKEN, "global", PushRuleKind::Room, "!r:x", false)
            .unwrap();
        assert_eq!(enable.path, "/_matrix/client/v3/pushrules/global/room/%21r%3Ax/enabled");
        assert_eq!(enable.body.as_deref(), Some(r#"{"enabled":false}"#));

        let actions = api
            .build_set_pushrule_actions(TOKEN, "global", PushRuleKind::Underride, "u", &[PushAction::DontNotify])
            .unwrap();
        assert_eq!(actions.path, "/_matrix/client/v3/pushrules/global/underride/u/actions");
        assert_eq!(actions.body.as_deref(), Some(r#"{"actions":["dont_notify"]}"#));
    }
}
