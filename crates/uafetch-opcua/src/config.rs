// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Engine settings.
//!
//! Settings are plain values: built once (from a file by `uafetch-config` or
//! with the builders here), validated, then handed to the engine which never
//! mutates them.
//!
//! ```text
//! ClientSettings
//! ├── endpoint_url, security_policy, application_name, transport_protocol
//! ├── pki_dir, auto_generate_certificates, trust_server_certs
//! ├── url_match
//! └── timeouts: TimeoutSettings
//!
//! BrowseSettings
//! ├── starting_node, max_recursive_depth, print_indentation
//! └── depth_limit_policy, branch_failure_policy
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConfigurationError, OpcUaError, OpcUaResult};
use crate::types::{NodeId, SecurityPolicy, TransportProtocol};

// =============================================================================
// ClientSettings
// =============================================================================

/// Connection-level settings shared by every engine operation.
///
/// # Examples
///
/// ```
/// use uafetch_opcua::config::ClientSettings;
/// use uafetch_opcua::types::SecurityPolicy;
///
/// let settings = ClientSettings::builder()
///     .endpoint_url("opc.tcp://localhost:4840")
///     .security_policy(SecurityPolicy::Basic256Rsa256)
///     .application_name("plant-reader")
///     .build()
///     .unwrap();
///
/// assert_eq!(settings.product_uri(), "urn:plant-reader");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Server endpoint URL (e.g., "opc.tcp://localhost:4840").
    pub endpoint_url: String,

    /// Requested security policy. `None` means unset; selection then falls
    /// back to the `None` policy with a warning.
    #[serde(default, deserialize_with = "deserialize_lenient_policy")]
    pub security_policy: Option<SecurityPolicy>,

    /// Application name used for certificates and client metadata.
    #[serde(default = "default_application_name")]
    pub application_name: String,

    /// Transport protocol. Only `opc.tcp` is supported.
    #[serde(default)]
    pub transport_protocol: TransportProtocol,

    /// PKI directory holding own certificates and private keys.
    #[serde(default = "default_pki_dir")]
    pub pki_dir: PathBuf,

    /// Generate missing certificates instead of failing.
    #[serde(default = "default_true")]
    pub auto_generate_certificates: bool,

    /// Load the HTTPS key pair even when the policy needs no certificate.
    #[serde(default)]
    pub https_certificate_for_none: bool,

    /// Accept any server certificate (testing only).
    #[serde(default)]
    pub trust_server_certs: bool,

    /// Requested session lifetime on the server.
    #[serde(default = "default_session_timeout", with = "humantime_serde")]
    pub session_timeout: Duration,

    /// How discovered endpoint URLs are compared with `endpoint_url`.
    #[serde(default)]
    pub url_match: UrlMatch,

    /// Call-boundary timeouts.
    #[serde(default)]
    pub timeouts: TimeoutSettings,
}

fn default_application_name() -> String {
    "uafetch".to_string()
}

fn default_pki_dir() -> PathBuf {
    PathBuf::from("pki")
}

fn default_true() -> bool {
    true
}

fn default_session_timeout() -> Duration {
    Duration::from_secs(60)
}

impl ClientSettings {
    /// Creates a new settings builder.
    pub fn builder() -> ClientSettingsBuilder {
        ClientSettingsBuilder::default()
    }

    /// Creates settings for an endpoint with every other field defaulted.
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            security_policy: None,
            application_name: default_application_name(),
            transport_protocol: TransportProtocol::OpcTcp,
            pki_dir: default_pki_dir(),
            auto_generate_certificates: true,
            https_certificate_for_none: false,
            trust_server_certs: false,
            session_timeout: default_session_timeout(),
            url_match: UrlMatch::Exact,
            timeouts: TimeoutSettings::default(),
        }
    }

    /// Product URI derived from the application name.
    pub fn product_uri(&self) -> String {
        format!("urn:{}", self.application_name)
    }

    /// Validates the settings.
    pub fn validate(&self) -> OpcUaResult<()> {
        if self.endpoint_url.trim().is_empty() {
            return Err(ConfigurationError::missing_field("endpoint_url").into());
        }

        match TransportProtocol::from_url(&self.endpoint_url) {
            None => {
                return Err(OpcUaError::invalid_endpoint(
                    &self.endpoint_url,
                    "expected <scheme>://<host>:<port>",
                ))
            }
            Some(scheme) if scheme != self.transport_protocol => {
                return Err(OpcUaError::invalid_endpoint(
                    &self.endpoint_url,
                    format!(
                        "scheme {} does not match transport_protocol {}",
                        scheme, self.transport_protocol
                    ),
                ))
            }
            Some(_) => {}
        }

        if self.transport_protocol != TransportProtocol::OpcTcp {
            return Err(ConfigurationError::invalid_value(
                "transport_protocol",
                format!("{} is not supported, use opc.tcp", self.transport_protocol),
            )
            .into());
        }

        if self.application_name.trim().is_empty() {
            return Err(ConfigurationError::missing_field("application_name").into());
        }

        if self.application_name.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(ConfigurationError::invalid_value(
                "application_name",
                "must not contain whitespace or '/'",
            )
            .into());
        }

        self.timeouts.validate()
    }
}

// =============================================================================
// ClientSettingsBuilder
// =============================================================================

/// Builder for [`ClientSettings`].
#[derive(Debug, Default)]
pub struct ClientSettingsBuilder {
    endpoint_url: Option<String>,
    security_policy: Option<SecurityPolicy>,
    application_name: Option<String>,
    pki_dir: Option<PathBuf>,
    auto_generate_certificates: Option<bool>,
    https_certificate_for_none: Option<bool>,
    trust_server_certs: Option<bool>,
    session_timeout: Option<Duration>,
    url_match: Option<UrlMatch>,
    timeouts: Option<TimeoutSettings>,
}

impl ClientSettingsBuilder {
    /// Sets the endpoint URL.
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Sets the security policy.
    pub fn security_policy(mut self, policy: SecurityPolicy) -> Self {
        self.security_policy = Some(policy);
        self
    }

    /// Sets the application name.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Sets the PKI directory.
    pub fn pki_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pki_dir = Some(dir.into());
        self
    }

    /// Enables or disables certificate generation.
    pub fn auto_generate_certificates(mut self, enabled: bool) -> Self {
        self.auto_generate_certificates = Some(enabled);
        self
    }

    /// Loads the HTTPS key pair for the `None` policy too.
    pub fn https_certificate_for_none(mut self, enabled: bool) -> Self {
        self.https_certificate_for_none = Some(enabled);
        self
    }

    /// Trusts all server certificates.
    pub fn trust_server_certs(mut self, trust: bool) -> Self {
        self.trust_server_certs = Some(trust);
        self
    }

    /// Sets the requested session lifetime.
    pub fn session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = Some(timeout);
        self
    }

    /// Sets the URL matching mode.
    pub fn url_match(mut self, mode: UrlMatch) -> Self {
        self.url_match = Some(mode);
        self
    }

    /// Sets the call-boundary timeouts.
    pub fn timeouts(mut self, timeouts: TimeoutSettings) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Builds and validates the settings.
    pub fn build(self) -> OpcUaResult<ClientSettings> {
        let endpoint_url = self
            .endpoint_url
            .ok_or_else(|| OpcUaError::configuration(ConfigurationError::missing_field("endpoint_url")))?;

        let mut settings = ClientSettings::new(endpoint_url);
        settings.security_policy = self.security_policy;
        if let Some(name) = self.application_name {
            settings.application_name = name;
        }
        if let Some(dir) = self.pki_dir {
            settings.pki_dir = dir;
        }
        if let Some(enabled) = self.auto_generate_certificates {
            settings.auto_generate_certificates = enabled;
        }
        if let Some(enabled) = self.https_certificate_for_none {
            settings.https_certificate_for_none = enabled;
        }
        if let Some(trust) = self.trust_server_certs {
            settings.trust_server_certs = trust;
        }
        if let Some(timeout) = self.session_timeout {
            settings.session_timeout = timeout;
        }
        if let Some(mode) = self.url_match {
            settings.url_match = mode;
        }
        if let Some(timeouts) = self.timeouts {
            settings.timeouts = timeouts;
        }

        settings.validate()?;
        Ok(settings)
    }
}

// =============================================================================
// UrlMatch
// =============================================================================

/// URL comparison applied by the last endpoint selection stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UrlMatch {
    /// Discovered URL must equal the configured one (a single trailing `/`
    /// is ignored on either side).
    #[default]
    Exact,
    /// Skip the URL stage; policy and protocol only.
    Ignore,
}

// =============================================================================
// TimeoutSettings
// =============================================================================

/// Timeouts applied at each blocking call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutSettings {
    /// Endpoint discovery.
    #[serde(default = "default_discovery_timeout", with = "humantime_serde")]
    pub discovery: Duration,

    /// Channel creation plus activation.
    #[serde(default = "default_session_setup_timeout", with = "humantime_serde")]
    pub session: Duration,

    /// A single read request.
    #[serde(default = "default_read_timeout", with = "humantime_serde")]
    pub read: Duration,

    /// A single browse request (one node).
    #[serde(default = "default_browse_timeout", with = "humantime_serde")]
    pub browse: Duration,

    /// Session close.
    #[serde(default = "default_close_timeout", with = "humantime_serde")]
    pub close: Duration,
}

fn default_discovery_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_session_setup_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_read_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_browse_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_close_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            discovery: default_discovery_timeout(),
            session: default_session_setup_timeout(),
            read: default_read_timeout(),
            browse: default_browse_timeout(),
            close: default_close_timeout(),
        }
    }
}

impl TimeoutSettings {
    /// Uses the same timeout for every boundary.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            discovery: timeout,
            session: timeout,
            read: timeout,
            browse: timeout,
            close: timeout,
        }
    }

    /// Validates that every timeout is non-zero.
    pub fn validate(&self) -> OpcUaResult<()> {
        let fields = [
            ("timeouts.discovery", self.discovery),
            ("timeouts.session", self.session),
            ("timeouts.read", self.read),
            ("timeouts.browse", self.browse),
            ("timeouts.close", self.close),
        ];
        for (field, value) in fields {
            if value.is_zero() {
                return Err(ConfigurationError::invalid_value(field, "must be greater than 0").into());
            }
        }
        Ok(())
    }
}

// =============================================================================
// BrowseSettings
// =============================================================================

/// What to do when a child would be visited below `max_recursive_depth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DepthLimitPolicy {
    /// Stop descending below the bound; siblings are still listed.
    #[default]
    SkipSubtree,
    /// Stop the whole traversal at the first exceedance.
    AbortTraversal,
}

/// What to do when browsing a node below the start node fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BranchFailurePolicy {
    /// Record the failure, skip that subtree, continue with siblings.
    #[default]
    BestEffort,
    /// Fail the whole traversal.
    FailFast,
}

/// Settings of a tree listing.
///
/// ```
/// use uafetch_opcua::config::BrowseSettings;
///
/// let settings = BrowseSettings::new(2).with_indentation(true);
/// assert_eq!(settings.start_node().unwrap().to_string(), "i=84");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowseSettings {
    /// Start node; the server root (`i=84`) when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_node: Option<String>,

    /// Depth bound. Children of the start node are at depth 1.
    pub max_recursive_depth: usize,

    /// Prefix each line with `"- "` per depth level.
    #[serde(default)]
    pub print_indentation: bool,

    /// Depth exceedance behavior.
    #[serde(default)]
    pub depth_limit_policy: DepthLimitPolicy,

    /// Subtree failure behavior.
    #[serde(default)]
    pub branch_failure_policy: BranchFailurePolicy,
}

impl BrowseSettings {
    /// Creates settings with a depth bound and defaults elsewhere.
    pub fn new(max_recursive_depth: usize) -> Self {
        Self {
            starting_node: None,
            max_recursive_depth,
            print_indentation: false,
            depth_limit_policy: DepthLimitPolicy::default(),
            branch_failure_policy: BranchFailurePolicy::default(),
        }
    }

    /// Sets the start node text.
    pub fn with_starting_node(mut self, node: impl Into<String>) -> Self {
        self.starting_node = Some(node.into());
        self
    }

    /// Enables or disables indentation.
    pub fn with_indentation(mut self, enabled: bool) -> Self {
        self.print_indentation = enabled;
        self
    }

    /// Sets the depth limit policy.
    pub fn with_depth_limit_policy(mut self, policy: DepthLimitPolicy) -> Self {
        self.depth_limit_policy = policy;
        self
    }

    /// Sets the branch failure policy.
    pub fn with_branch_failure_policy(mut self, policy: BranchFailurePolicy) -> Self {
        self.branch_failure_policy = policy;
        self
    }

    /// Parses the start node, defaulting to the root folder.
    pub fn start_node(&self) -> OpcUaResult<NodeId> {
        match self.starting_node.as_deref().map(str::trim) {
            None | Some("") => Ok(NodeId::root_folder()),
            Some(text) => text.parse(),
        }
    }
}

// =============================================================================
// Serde helpers
// =============================================================================

/// Accepts any policy text; unknown names become "unset".
fn deserialize_lenient_policy<'de, D>(deserializer: D) -> Result<Option<SecurityPolicy>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|text| {
        let policy = SecurityPolicy::parse_lenient(&text);
        if policy.is_none() {
            tracing::warn!(value = %text, "Unrecognized security_policy, treating as unset");
        }
        policy
    }))
}

mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        humantime::format_duration(*duration)
            .to_string()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let settings = ClientSettings::builder()
            .endpoint_url("opc.tcp://localhost:4840")
            .build()
            .unwrap();

        assert_eq!(settings.security_policy, None);
        assert_eq!(settings.application_name, "uafetch");
        assert_eq!(settings.product_uri(), "urn:uafetch");
        assert_eq!(settings.timeouts.discovery, Duration::from_secs(10));
        assert_eq!(settings.url_match, UrlMatch::Exact);
    }

    #[test]
    fn test_builder_requires_endpoint() {
        let err = ClientSettings::builder().build().unwrap_err();
        assert!(err.to_string().contains("endpoint_url"));
    }

    #[test]
    fn test_validate_rejects_other_transports() {
        let err = ClientSettings::builder()
            .endpoint_url("https://localhost:4843")
            .build()
            .unwrap_err();
        assert_eq!(err.category(), "configuration");

        let err = ClientSettings::builder()
            .endpoint_url("localhost:4840")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("localhost:4840"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut timeouts = TimeoutSettings::default();
        timeouts.read = Duration::ZERO;
        let err = ClientSettings::builder()
            .endpoint_url("opc.tcp://localhost:4840")
            .timeouts(timeouts)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("timeouts.read"));
    }

    #[test]
    fn test_deserialize_lenient_policy() {
        let json = r#"{"endpoint_url": "opc.tcp://h:4840", "security_policy": "Basic256Sha256"}"#;
        let settings: ClientSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.security_policy, Some(SecurityPolicy::Basic256Rsa256));

        let json = r#"{"endpoint_url": "opc.tcp://h:4840", "security_policy": "Aes256"}"#;
        let settings: ClientSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.security_policy, None);

        let json = r#"{"endpoint_url": "opc.tcp://h:4840"}"#;
        let settings: ClientSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.security_policy, None);
    }

    #[test]
    fn test_deserialize_humantime_timeouts() {
        let json = r#"{"endpoint_url": "opc.tcp://h:4840", "timeouts": {"read": "500ms"}}"#;
        let settings: ClientSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.timeouts.read, Duration::from_millis(500));
        assert_eq!(settings.timeouts.close, Duration::from_secs(5));
    }

    #[test]
    fn test_browse_settings_start_node() {
        assert_eq!(BrowseSettings::new(1).start_node().unwrap(), NodeId::root_folder());
        assert_eq!(
            BrowseSettings::new(1)
                .with_starting_node("ns=2;s=Line1")
                .start_node()
                .unwrap(),
            NodeId::string(2, "Line1")
        );
        assert!(BrowseSettings::new(1)
            .with_starting_node("bogus")
            .start_node()
            .is_err());
    }

    #[test]
    fn test_browse_settings_policies_deserialize() {
        let json = r#"{"max_recursive_depth": 3, "depth_limit_policy": "abort_traversal",
                       "branch_failure_policy": "fail_fast"}"#;
        let settings: BrowseSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.depth_limit_policy, DepthLimitPolicy::AbortTraversal);
        assert_eq!(settings.branch_failure_policy, BranchFailurePolicy::FailFast);
        assert!(!settings.print_indentation);
    }
}
