use std::{env, sync::LazyLock};

use super::types::{AttestationPreference, ConflictPolicy, UserVerification};

pub(crate) static PASSKEY_CEREMONY_CONFLICT_POLICY: LazyLock<ConflictPolicy> =
    LazyLock::new(conflict_policy_from_env);

pub(crate) static PASSKEY_USER_VERIFICATION: LazyLock<UserVerification> =
    LazyLock::new(user_verification_from_env);

pub(crate) static PASSKEY_ATTESTATION: LazyLock<AttestationPreference> =
    LazyLock::new(attestation_from_env);

fn conflict_policy_from_env() -> ConflictPolicy {
    parse_conflict_policy(env::var("PASSKEY_CEREMONY_CONFLICT_POLICY").ok())
}

fn user_verification_from_env() -> UserVerification {
    parse_user_verification(env::var("PASSKEY_USER_VERIFICATION").ok())
}

fn attestation_from_env() -> AttestationPreference {
    parse_attestation(env::var("PASSKEY_ATTESTATION").ok())
}

fn parse_conflict_policy(value: Option<String>) -> ConflictPolicy {
    match value {
        None => ConflictPolicy::Replace,
        Some(v) => match v.to_lowercase().as_str() {
            "replace" => ConflictPolicy::Replace,
            "reject" => ConflictPolicy::Reject,
            invalid => {
                tracing::warn!(
                    "Invalid ceremony conflict policy: {}. Using default 'replace'",
                    invalid
                );
                ConflictPolicy::Replace
            }
        },
    }
}

fn parse_user_verification(value: Option<String>) -> UserVerification {
    value.map_or(
        UserVerification::Preferred, // Default to preferred
        |v| match v.to_lowercase().as_str() {
            "required" => UserVerification::Required,
            "preferred" => UserVerification::Preferred,
            "discouraged" => UserVerification::Discouraged,
            _ => {
                tracing::warn!("Invalid user verification: {}. Using default 'preferred'", v);
                UserVerification::Preferred
            }
        },
    )
}

fn parse_attestation(value: Option<String>) -> AttestationPreference {
    match value {
        None => AttestationPreference::None,
        Some(v) => match v.to_lowercase().as_str() {
            "none" => AttestationPreference::None,
            "indirect" => AttestationPreference::Indirect,
            "direct" => AttestationPreference::Direct,
            "enterprise" => AttestationPreference::Enterprise,
            invalid => {
                tracing::warn!("Invalid attestation: {}. Using default 'none'", invalid);
                AttestationPreference::None
            }
        },
    }
}
