use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /session` - the management session handed out for a
/// bearer credential. `id` stays optional so a missing field is detected
/// as a protocol error rather than a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub id: Option<String>,

    /// Entitlements attached to the session. A missing list means no rights.
    #[serde(default)]
    pub rights: Vec<Right>,
}

/// A single entitlement label. Rights without an `id` deserialize to an
/// empty string, which can never match a required right.
#[derive(Debug, Clone, Deserialize)]
pub struct Right {
    #[serde(default)]
    pub id: String,
}

/// Generic `{items: [...]}` envelope used by the lookup endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemList<T> {
    // Path form: the bare `#[serde(default)]` would add a spurious
    // `T: Default` bound to the derived impl.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// SLA template or policy entry as returned by `/slt` and `/slt/{id}/policy`.
#[derive(Debug, Clone, Deserialize)]
pub struct SlaItem {
    #[serde(deserialize_with = "lenient_id")]
    pub id: u64,
    pub name: String,
}

/// Application entry as returned by `/application`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationItem {
    #[serde(deserialize_with = "lenient_id")]
    pub id: u64,

    #[serde(rename = "appname")]
    pub name: String,
}

/// Body of `POST /application/{id}/backup`. The policy id must go out as a
/// JSON integer even though the lookup endpoints return it as a string.
#[derive(Debug, Clone, Serialize)]
pub struct BackupRequest {
    pub policy: PolicyRef,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PolicyRef {
    pub id: u64,
}

impl BackupRequest {
    pub fn new(policy_id: u64) -> Self {
        Self {
            policy: PolicyRef { id: policy_id },
            label: None,
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }
}

/// Status and body of the backup-trigger response, kept verbatim so the
/// caller can report the service's own words on rejection.
#[derive(Debug, Clone)]
pub struct TriggerReply {
    pub status: u16,
    pub body: String,
}

/// The service emits numeric identifiers both as JSON numbers and as
/// numeric strings; accept either.
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Num(u64),
        Text(String),
    }

    match IdRepr::deserialize(deserializer)? {
        IdRepr::Num(n) => Ok(n),
        IdRepr::Text(s) => s.trim().parse::<u64>().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_info_full_response() {
        let raw = json!({
            "id": "S1",
            "rights": [
                {"id": "Access to Backup & Recover", "description": "backup"},
                {"id": "System View"}
            ],
            "user": "svc-backup"
        });

        let session: SessionInfo = serde_json::from_value(raw).unwrap();
        assert_eq!(session.id.as_deref(), Some("S1"));
        assert_eq!(session.rights.len(), 2);
        assert_eq!(session.rights[0].id, "Access to Backup & Recover");
    }

    #[test]
    fn test_session_info_missing_id_and_rights() {
        let session: SessionInfo = serde_json::from_value(json!({})).unwrap();
        assert!(session.id.is_none());
        assert!(session.rights.is_empty());

        // A right without an id cannot match anything but must not fail parsing.
        let session: SessionInfo =
            serde_json::from_value(json!({"id": "S1", "rights": [{"role": "admin"}]})).unwrap();
        assert_eq!(session.rights.len(), 1);
        assert_eq!(session.rights[0].id, "");
    }

    #[test]
    fn test_sla_items_accept_numeric_and_string_ids() {
        let raw = json!({
            "items": [
                {"id": 42, "name": "snapshot_B-1d-14d"},
                {"id": "108", "name": "gold"}
            ]
        });

        let list: ItemList<SlaItem> = serde_json::from_value(raw).unwrap();
        assert_eq!(list.items[0].id, 42);
        assert_eq!(list.items[1].id, 108);
        assert_eq!(list.items[1].name, "gold");
    }

    #[test]
    fn test_item_list_defaults_to_empty() {
        let list: ItemList<SlaItem> = serde_json::from_value(json!({})).unwrap();
        assert!(list.items.is_empty());
    }

    #[test]
    fn test_non_numeric_id_is_rejected() {
        let raw = json!({"items": [{"id": "slt-first", "name": "tpl"}]});
        let result: std::result::Result<ItemList<SlaItem>, _> = serde_json::from_value(raw);
        assert!(result.is_err());
    }

    #[test]
    fn test_application_item_uses_appname_field() {
        let raw = json!({
            "items": [
                {"id": "3", "appname": "web-01", "hostid": "7"}
            ]
        });

        let list: ItemList<ApplicationItem> = serde_json::from_value(raw).unwrap();
        assert_eq!(list.items[0].id, 3);
        assert_eq!(list.items[0].name, "web-01");
    }

    #[test]
    fn test_backup_request_serialization() {
        let request = BackupRequest::new(2);
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded, json!({"policy": {"id": 2}}));

        let request = BackupRequest::new(2).with_label(Some("nightly".to_string()));
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded, json!({"policy": {"id": 2}, "label": "nightly"}));
    }
}
