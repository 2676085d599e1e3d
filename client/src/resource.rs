use conjur_core::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The kind half of a Conjur resource id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A human user.
    User,
    /// A machine identity.
    Host,
    /// A collection of hosts.
    Layer,
    /// A collection of users.
    Group,
    /// A policy document.
    Policy,
    /// A secret-holding variable.
    Variable,
    /// A protected web service.
    Webservice,
}

impl ResourceKind {
    /// The kind as it appears in resource ids and REST paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Host => "host",
            ResourceKind::Layer => "layer",
            ResourceKind::Group => "group",
            ResourceKind::Policy => "policy",
            ResourceKind::Variable => "variable",
            ResourceKind::Webservice => "webservice",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(ResourceKind::User),
            "host" => Ok(ResourceKind::Host),
            "layer" => Ok(ResourceKind::Layer),
            "group" => Ok(ResourceKind::Group),
            "policy" => Ok(ResourceKind::Policy),
            "variable" => Ok(ResourceKind::Variable),
            "webservice" => Ok(ResourceKind::Webservice),
            _ => Err(Error::unexpected(format!("unknown resource kind `{s}`"))),
        }
    }
}

/// A resource as returned by the list endpoint.
///
/// The full id is an `account:kind:id` triple; the id part may itself
/// contain separators, so splitting stops after the kind.
#[derive(Debug, Clone)]
pub struct Resource {
    /// The document as returned by the appliance.
    pub raw: Value,
    /// Account owning the resource.
    pub account: String,
    /// Kind of the resource.
    pub kind: ResourceKind,
    /// Account- and kind-relative id.
    pub id: String,
    /// The full `account:kind:id` triple.
    pub full_id: String,
    /// Annotations flattened into a map.
    pub annotations: HashMap<String, String>,
}

impl Resource {
    /// Parse a resource from its JSON document.
    pub fn from_json(raw: Value) -> Result<Self> {
        let full_id = raw
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::unexpected("resource document has no `id` field"))?
            .to_string();

        let mut parts = full_id.splitn(3, ':');
        let (Some(account), Some(kind), Some(id)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::unexpected(format!(
                "malformed resource id `{full_id}`"
            )));
        };
        let account = account.to_string();
        let kind = kind.parse::<ResourceKind>()?;
        let id = id.to_string();

        let mut annotations = HashMap::new();
        if let Some(list) = raw.get("annotations").and_then(Value::as_array) {
            for entry in list.iter().filter_map(Value::as_object) {
                for (key, value) in entry {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    annotations.insert(key.clone(), value);
                }
            }
        }

        Ok(Self {
            raw,
            account,
            kind,
            id,
            full_id,
            annotations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_resource() {
        let doc = json!({
            "id": "conjur:variable:prod/db/password",
            "owner": "conjur:policy:prod/db",
            "annotations": [
                {"name": "description", "value": "database password"},
                {"rotation/ttl": "P1D"},
            ],
        });

        let resource = Resource::from_json(doc).unwrap();
        assert_eq!(resource.account, "conjur");
        assert_eq!(resource.kind, ResourceKind::Variable);
        assert_eq!(resource.id, "prod/db/password");
        assert_eq!(resource.full_id, "conjur:variable:prod/db/password");
        assert_eq!(
            resource.annotations.get("name").map(String::as_str),
            Some("description")
        );
        assert_eq!(
            resource.annotations.get("rotation/ttl").map(String::as_str),
            Some("P1D")
        );
        assert_eq!(
            resource.raw.get("owner").and_then(Value::as_str),
            Some("conjur:policy:prod/db")
        );
    }

    #[test]
    fn test_parse_resource_id_with_extra_separators() {
        let doc = json!({"id": "conjur:host:teams:blue/api", "annotations": []});

        let resource = Resource::from_json(doc).unwrap();
        assert_eq!(resource.kind, ResourceKind::Host);
        assert_eq!(resource.id, "teams:blue/api");
    }

    #[test]
    fn test_parse_resource_rejects_malformed() {
        for doc in [
            json!({"name": "missing id"}),
            json!({"id": "conjur:variable"}),
            json!({"id": "conjur:spaceship:prod/db"}),
        ] {
            assert!(Resource::from_json(doc).is_err());
        }
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            ResourceKind::User,
            ResourceKind::Host,
            ResourceKind::Layer,
            ResourceKind::Group,
            ResourceKind::Policy,
            ResourceKind::Variable,
            ResourceKind::Webservice,
        ] {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
        }
    }
}
