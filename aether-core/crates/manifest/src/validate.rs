//! Field-level validation shared by `build` and `decode`. Pure functions,
//! no I/O: every check here only looks at the strings and numbers already
//! in hand.

use crate::errors::ManifestError;
use unicode_normalization::is_nfc;

const MAX_PATH_BYTES: usize = 512;

/// Path hygiene: relative, forward-slash separated, ASCII, no `..` segment,
/// no leading/trailing slash, no empty segment, bounded length.
pub fn validate_path(path: &str) -> Result<(), ManifestError> {
    let fail = |reason: &str| {
        Err(ManifestError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        })
    };

    if path.is_empty() {
        return fail("path is empty");
    }
    if path.len() > MAX_PATH_BYTES {
        return fail("path exceeds 512 bytes");
    }
    if !path.is_ascii() {
        return fail("path must be ASCII");
    }
    if path.starts_with('/') || path.ends_with('/') {
        return fail("path must not start or end with '/'");
    }
    if path.contains('\\') {
        return fail("path must not contain backslash");
    }
    if path.contains("//") {
        return fail("path must not contain an empty segment");
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return fail("path must not contain an empty segment");
        }
        if segment == ".." || segment == "." {
            return fail("path must not contain '.' or '..' segments");
        }
        if !segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
        {
            return fail("path segment contains a disallowed character");
        }
    }
    Ok(())
}

/// NFC normalization and NUL-byte rejection for any free-text string field
/// (`build_meta` values, etc).
pub fn validate_text_field(field: &str, value: &str) -> Result<(), ManifestError> {
    if value.contains('\0') {
        return Err(ManifestError::NullByteInString {
            field: field.to_string(),
        });
    }
    if !is_nfc(value) {
        return Err(ManifestError::NotNFC {
            field: field.to_string(),
        });
    }
    Ok(())
}

pub fn validate_sha256_hex(path: &str, value: &str) -> Result<(), ManifestError> {
    let ok = value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase());
    if ok {
        Ok(())
    } else {
        Err(ManifestError::InvalidSHA256 {
            path: path.to_string(),
            value: value.to_string(),
        })
    }
}

pub fn validate_policy_hash(value: &str) -> Result<(), ManifestError> {
    let ok = value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase());
    if ok {
        Ok(())
    } else {
        Err(ManifestError::InvalidPolicyHash(value.to_string()))
    }
}

pub fn validate_content_type(path: &str, content_type: &str) -> Result<(), ManifestError> {
    if crate::model::CONTENT_TYPE_WHITELIST.contains(&content_type) {
        Ok(())
    } else {
        Err(ManifestError::InvalidContentType {
            path: path.to_string(),
            content_type: content_type.to_string(),
        })
    }
}

pub fn validate_role(path: &str, role: &str) -> Result<(), ManifestError> {
    if crate::model::ROLE_WHITELIST.contains(&role) {
        Ok(())
    } else {
        Err(ManifestError::InvalidRole {
            path: path.to_string(),
            role: role.to_string(),
        })
    }
}

pub fn validate_unit_scale(unit_scale: f64) -> Result<(), ManifestError> {
    if unit_scale.is_finite() && (0.001..=1000.0).contains(&unit_scale) {
        Ok(())
    } else {
        Err(ManifestError::InvalidUnitScale(unit_scale.to_string()))
    }
}

pub fn validate_bytes(path: &str, bytes: u64) -> Result<(), ManifestError> {
    if bytes >= 1 && bytes <= 5_000_000_000 {
        Ok(())
    } else {
        Err(ManifestError::InvalidBytes {
            path: path.to_string(),
            bytes,
        })
    }
}
