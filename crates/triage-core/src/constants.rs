//! Well-known API versions, kinds and wrapper data keys

/// Current canonical API group version
pub const TROUBLESHOOT_V1BETA2: &str = "troubleshoot.sh/v1beta2";

/// Legacy API group version, accepted on input and rewritten to v1beta2
pub const TROUBLESHOOT_V1BETA1: &str = "troubleshoot.replicated.com/v1beta1";

/// Core Kubernetes API version used by wrapper documents
pub const CORE_V1: &str = "v1";

/// Wrapper document kinds
pub const SECRET_KIND: &str = "Secret";
pub const CONFIGMAP_KIND: &str = "ConfigMap";

/// Data keys under which wrapper documents embed specs.
///
/// Order matters: specs are extracted in this order.
pub mod keys {
    pub const SUPPORT_BUNDLE: &str = "support-bundle-spec";
    pub const REDACTOR: &str = "redactor-spec";
    pub const PREFLIGHT: &str = "preflight-spec";
    /// Historical preflight key name
    pub const PREFLIGHT_LEGACY: &str = "preflight.yaml";

    pub const ALL: [&str; 4] = [SUPPORT_BUNDLE, REDACTOR, PREFLIGHT, PREFLIGHT_LEGACY];
}

/// Secret type and data key for inline registry credentials
pub const DOCKER_CONFIG_JSON_TYPE: &str = "kubernetes.io/dockerconfigjson";
pub const DOCKER_CONFIG_JSON_KEY: &str = ".dockerconfigjson";

/// Exit code for problems with user supplied specs
pub const EXIT_CODE_SPEC_ISSUES: i32 = 2;
