//! Declarative builders for configuration structs.

/// Derive a consuming builder for a `Default` configuration struct.
///
/// Each field is listed with its setter type and a mode:
///
/// - `[required]`: `build()` fails with
///   [`BuilderError::MissingRequiredField`](crate::error::BuilderError)
///   when the setter was never called
/// - `[or_default]`: unset fields take the value from `Config::default()`
/// - `[optional]`: the config field is `Option<T>`; the setter takes `T`
///
/// ```ignore
/// impl_builder! {
///     DumpConfig => DumpConfigBuilder {
///         trace: PathBuf [required],
///         strict_checkpoints: bool [or_default],
///     }
/// }
/// ```
macro_rules! impl_builder {
    (@field required, $Builder:ident, $field:ident, $value:expr, $default:expr) => {
        $value.ok_or($crate::error::BuilderError::MissingRequiredField {
            builder: stringify!($Builder),
            field: stringify!($field),
        })?
    };
    (@field or_default, $Builder:ident, $field:ident, $value:expr, $default:expr) => {
        $value.unwrap_or($default)
    };
    (@field optional, $Builder:ident, $field:ident, $value:expr, $default:expr) => {
        $value.or($default)
    };

    (
        $Config:ident => $Builder:ident {
            $( $field:ident : $ty:ty [$mode:ident] ),* $(,)?
        }
    ) => {
        #[doc = concat!("Builder for [`", stringify!($Config), "`].")]
        #[derive(Debug, Clone, Default)]
        #[must_use]
        pub struct $Builder {
            $( $field: Option<$ty>, )*
        }

        impl $Config {
            #[doc = concat!("Start building a [`", stringify!($Config), "`].")]
            pub fn builder() -> $Builder {
                $Builder::default()
            }
        }

        impl $Builder {
            $(
                pub fn $field(mut self, value: impl Into<$ty>) -> Self {
                    self.$field = Some(value.into());
                    self
                }
            )*

            pub fn build(self) -> Result<$Config, $crate::error::BuilderError> {
                #[allow(unused_variables)]
                let defaults = $Config::default();
                Ok($Config {
                    $(
                        $field: $crate::builder::impl_builder!(
                            @field $mode, $Builder, $field, self.$field, defaults.$field
                        ),
                    )*
                })
            }
        }
    };
}

pub(crate) use impl_builder;
