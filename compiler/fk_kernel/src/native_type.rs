//! Fortran type × kind → native type mapping.

/// Native type for types the table does not cover.
pub const GENERIC_NATIVE_TYPE: &str = "void*";

/// Byte size reported when the element size is unknown.
pub const UNKNOWN_BYTES: &str = "-1";

/// Native (HIP C++) spelling of a Fortran scalar type.
///
/// `kind` may be empty (default kind), a byte count (`8`) or an
/// `iso_c_binding` constant name (`c_double`). Derived types other than
/// `type(c_ptr)` and unrecognised kinds map to [`GENERIC_NATIVE_TYPE`].
pub fn native_type(f_type: &str, kind: &str) -> &'static str {
    let f_type = f_type.trim().to_ascii_lowercase();
    let kind = kind.trim().to_ascii_lowercase();
    let mapped = match (f_type.as_str(), kind.as_str()) {
        ("integer", "" | "4" | "c_int" | "c_int32_t") => Some("int"),
        ("integer", "8" | "c_long" | "c_long_long" | "c_int64_t" | "c_size_t") => Some("long"),
        ("integer", "2" | "c_short" | "c_int16_t") => Some("short"),
        ("integer", "1" | "c_signed_char" | "c_int8_t") => Some("char"),
        ("real", "" | "4" | "c_float") => Some("float"),
        ("real", "8" | "c_double") => Some("double"),
        ("real", "16" | "c_long_double") => Some("long double"),
        ("complex", "" | "4" | "c_float_complex") => Some("hipFloatComplex"),
        ("complex", "8" | "c_double_complex") => Some("hipDoubleComplex"),
        ("logical", _) => Some("bool"),
        ("character", _) => Some("char"),
        ("type", "c_ptr") => Some("void*"),
        _ => None,
    };
    mapped.unwrap_or_else(|| {
        tracing::debug!("no native type for '{f_type}' of kind '{kind}'");
        GENERIC_NATIVE_TYPE
    })
}

/// Size in bytes of one element, if known.
pub fn bytes_per_element(f_type: &str, kind: &str) -> Option<u32> {
    let f_type = f_type.trim().to_ascii_lowercase();
    let kind = kind.trim().to_ascii_lowercase();
    match (f_type.as_str(), kind.as_str()) {
        ("integer", "1" | "c_signed_char" | "c_int8_t") => Some(1),
        ("integer", "2" | "c_short" | "c_int16_t") => Some(2),
        ("integer", "" | "4" | "c_int" | "c_int32_t") => Some(4),
        ("integer", "8" | "c_long" | "c_long_long" | "c_int64_t" | "c_size_t") => Some(8),
        ("real", "" | "4" | "c_float") => Some(4),
        ("real", "8" | "c_double") => Some(8),
        ("real", "16" | "c_long_double") => Some(16),
        ("complex", "" | "4" | "c_float_complex") => Some(8),
        ("complex", "8" | "c_double_complex") => Some(16),
        ("complex", "16") => Some(32),
        ("logical", "" | "4" | "c_bool") => Some(4),
        ("character", _) => Some(1),
        ("type", "c_ptr") => Some(8),
        _ => None,
    }
}

/// Fortran type with its kind attached: `real(8)`, or just `real`.
pub fn fortran_type(f_type: &str, kind: &str) -> String {
    if kind.is_empty() {
        f_type.to_string()
    } else {
        format!("{f_type}({kind})")
    }
}
