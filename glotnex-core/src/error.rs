//! Error types for the glotnex core library.
//!
//! Defines the error enums exposed by the public API together with stable,
//! machine-readable error codes consumed by the CLI's error reporter.

use std::fmt;

use thiserror::Error;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while filtering records.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum FilterError {
    /// A record referenced a language identifier absent from the language table.
    #[error("language `{language_id}` is not present in the language table")]
    UnknownLanguage {
        /// The identifier that failed to resolve to a taxonomy code.
        language_id: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`FilterError`] variants.
    enum FilterErrorCode for FilterError {
        /// A record referenced a language identifier absent from the language table.
        UnknownLanguage => UnknownLanguage { .. } => "FILTER_UNKNOWN_LANGUAGE",
    }
}

/// An error produced while constructing a character matrix.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum MatrixError {
    /// Two distinct languages resolved to the same taxon label.
    #[error(
        "languages `{left_language_id}` and `{right_language_id}` both resolve to taxon `{taxon}`"
    )]
    DuplicateTaxon {
        /// Label shared by both languages.
        taxon: String,
        /// Language identifier that claimed the label first.
        left_language_id: String,
        /// Language identifier that collided with it.
        right_language_id: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`MatrixError`] variants.
    enum MatrixErrorCode for MatrixError {
        /// Two distinct languages resolved to the same taxon label.
        DuplicateTaxon => DuplicateTaxon { .. } => "MATRIX_DUPLICATE_TAXON",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_error_exposes_stable_code() {
        let err = FilterError::UnknownLanguage {
            language_id: "xyz".into(),
        };
        assert_eq!(err.code(), FilterErrorCode::UnknownLanguage);
        assert_eq!(err.code().as_str(), "FILTER_UNKNOWN_LANGUAGE");
        assert_eq!(err.code().to_string(), "FILTER_UNKNOWN_LANGUAGE");
    }

    #[test]
    fn matrix_error_exposes_stable_code() {
        let err = MatrixError::DuplicateTaxon {
            taxon: "Mota".into(),
            left_language_id: "a".into(),
            right_language_id: "b".into(),
        };
        assert_eq!(err.code(), MatrixErrorCode::DuplicateTaxon);
        assert_eq!(err.code().as_str(), "MATRIX_DUPLICATE_TAXON");
    }
}
