//! Macros to reduce boilerplate in the codebase

/// Macro to generate Display and FromStr implementations for enums
///
/// Parsing is case-insensitive; the first string listed for a variant is the
/// one used by `Display`, extra strings are accepted aliases.
///
/// # Usage
///
/// ```rust,ignore
/// enum_display_fromstr!(
///     RecordStatus,
///     AdminError::invalid_status,
///     {
///         Active => "active",
///         Deactive => "deactive" | "inactive",
///     }
/// );
/// ```
#[macro_export]
macro_rules! enum_display_fromstr {
    (
        $enum_name:ident,
        $error_fn:path,
        { $($variant:ident => $str:literal $(| $alias:literal)*),+ $(,)? }
    ) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $($enum_name::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = $crate::error::AdminError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str $(| $alias)* => Ok($enum_name::$variant),)+
                    _ => Err($error_fn(s.to_string())),
                }
            }
        }
    };
}
