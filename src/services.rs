//! Programmed subscriber services
//!
//! A programmed service is a UNI port together with the tagging
//! information the access controller provisioned for it. Services are
//! exposed in the datastore under user-chosen names (aliases); services
//! provisioned behind the bridge's back get a name derived from the port
//! and the service name.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Tagging information of a programmed service
///
/// Missing numeric fields read as 0, matching the controller's JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UniTag {
    pub uni_tag_match: i32,
    pub pon_c_tag: i32,
    pub pon_s_tag: i32,
    pub technology_profile_id: i32,
    pub upstream_bandwidth_profile: String,
    pub upstream_olt_bandwidth_profile: String,
    pub downstream_bandwidth_profile: String,
    pub downstream_olt_bandwidth_profile: String,
    pub is_dhcp_required: bool,
    pub is_igmp_required: bool,
    pub is_pppoe_required: bool,
    pub configured_mac_address: String,
    pub enable_mac_learning: bool,
    pub us_pon_c_tag_priority: i32,
    pub us_pon_s_tag_priority: i32,
    pub ds_pon_c_tag_priority: i32,
    pub ds_pon_s_tag_priority: i32,
    pub service_name: String,
}

/// A service programmed on a named UNI port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgrammedService {
    pub port_name: String,
    pub tag: UniTag,
}

/// Identifies one service across requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceKey {
    pub port: String,
    pub s_tag: String,
    pub c_tag: String,
    pub tp_id: String,
}

impl ServiceKey {
    /// Alias lookup key of a programmed service
    pub fn for_service(service: &ProgrammedService) -> Self {
        Self {
            port: service.port_name.clone(),
            s_tag: service.tag.pon_s_tag.to_string(),
            c_tag: service.tag.pon_c_tag.to_string(),
            tp_id: service.tag.technology_profile_id.to_string(),
        }
    }
}

/// User-provided names of a service in the datastore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAlias {
    pub key: ServiceKey,
    pub service_name: String,
    pub vlans_name: String,
}

impl ServiceAlias {
    /// Names derived from the port and the controller's service name
    pub fn fallback(key: ServiceKey, uni_tag_service_name: &str) -> Self {
        let service_name = format!("{}-{}", key.port, uni_tag_service_name);
        Self {
            vlans_name: format!("{}-vlans", service_name),
            service_name,
            key,
        }
    }
}

/// Service-facing collaborator
pub trait ServiceProvider: Send + Sync {
    /// Services currently programmed, with their port names resolved
    fn programmed_services(&self) -> Result<Vec<ProgrammedService>>;

    /// Alias stored for `key`, if any
    fn alias(&self, key: &ServiceKey) -> Result<Option<ServiceAlias>>;
}

/// Alias of `service`, or the fallback names when none is stored
///
/// The fallback is not written back: serving a request never changes the
/// provider's state.
pub fn resolve_alias(
    provider: &dyn ServiceProvider,
    service: &ProgrammedService,
) -> Result<ServiceAlias> {
    let key = ServiceKey::for_service(service);
    if let Some(alias) = provider.alias(&key)? {
        return Ok(alias);
    }

    let alias = ServiceAlias::fallback(key, &service.tag.service_name);
    warn!(
        port = %alias.key.port,
        fallback = %alias.service_name,
        "cannot-load-service-alias"
    );
    Ok(alias)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Aliases(HashMap<ServiceKey, ServiceAlias>);

    impl ServiceProvider for Aliases {
        fn programmed_services(&self) -> Result<Vec<ProgrammedService>> {
            Ok(Vec::new())
        }

        fn alias(&self, key: &ServiceKey) -> Result<Option<ServiceAlias>> {
            Ok(self.0.get(key).cloned())
        }
    }

    fn service() -> ProgrammedService {
        ProgrammedService {
            port_name: "BBSM00000001-1".to_string(),
            tag: UniTag {
                pon_s_tag: 111,
                pon_c_tag: 222,
                technology_profile_id: 64,
                service_name: "hsia".to_string(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_uni_tag_from_json() {
        let tag: UniTag = serde_json::from_str(
            r#"{"uniTagMatch": 4096, "ponCTag": 101, "ponSTag": 11, "technologyProfileId": 64,
                "isDhcpRequired": true, "isPppoeRequired": true, "usPonSTagPriority": -1,
                "serviceName": "hsia"}"#,
        )
        .unwrap();

        assert_eq!(tag.uni_tag_match, 4096);
        assert_eq!(tag.technology_profile_id, 64);
        assert!(tag.is_dhcp_required);
        assert!(tag.is_pppoe_required);
        assert!(!tag.is_igmp_required);
        assert_eq!(tag.us_pon_s_tag_priority, -1);
        assert_eq!(tag.ds_pon_s_tag_priority, 0);
    }

    #[test]
    fn test_service_key() {
        let key = ServiceKey::for_service(&service());
        assert_eq!(key.port, "BBSM00000001-1");
        assert_eq!(key.s_tag, "111");
        assert_eq!(key.c_tag, "222");
        assert_eq!(key.tp_id, "64");
    }

    #[test]
    fn test_stored_alias_wins() {
        let key = ServiceKey::for_service(&service());
        let stored = ServiceAlias {
            key: key.clone(),
            service_name: "internet".to_string(),
            vlans_name: "internet-vlans".to_string(),
        };
        let provider = Aliases(HashMap::from([(key, stored.clone())]));

        assert_eq!(resolve_alias(&provider, &service()).unwrap(), stored);
    }

    #[test]
    fn test_fallback_alias() {
        let provider = Aliases(HashMap::new());
        let alias = resolve_alias(&provider, &service()).unwrap();

        assert_eq!(alias.service_name, "BBSM00000001-1-hsia");
        assert_eq!(alias.vlans_name, "BBSM00000001-1-hsia-vlans");
        assert!(provider.0.is_empty());
    }
}
