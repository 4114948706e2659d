//! Application Load Balancer target-group event models.
//!
//! These types mirror the JSON document a load balancer sends to a Lambda
//! target and the document it expects back.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Proxy-invocation event delivered by an ALB target group.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AlbTargetGroupRequest {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub query_string_parameters: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub multi_value_query_string_parameters: HashMap<String, Vec<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub multi_value_headers: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub request_context: AlbTargetGroupRequestContext,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub body: Option<String>,
}

/// Invocation context attached to every ALB event.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AlbTargetGroupRequestContext {
    #[serde(default)]
    pub elb: ElbContext,
}

/// Identity of the target group that forwarded the request.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ElbContext {
    #[serde(default)]
    pub target_group_arn: String,
}

/// Response document returned to the load balancer.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AlbTargetGroupResponse {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub multi_value_headers: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// The load balancer sends `null` for maps it has nothing to put in.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
