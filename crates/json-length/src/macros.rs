/// Implements [`Measure`](crate::Measure) and [`Record`](crate::Record) for a
/// struct, listing each encoded field with its JSON name.
///
/// Fields marked `[omit_empty]` are skipped when they hold their type's empty
/// value. Fields that are not listed are not encoded.
///
/// ```
/// use json_joy_json_length::{length_of, record};
///
/// struct User {
///     name: String,
///     age: u32,
///     #[allow(dead_code)]
///     session: u64,
/// }
///
/// record!(User {
///     name => "Name",
///     age => "Age" [omit_empty],
/// });
///
/// let user = User { name: "Al".into(), age: 0, session: 9 };
/// // {"Name":"Al"}
/// assert_eq!(length_of(&user).unwrap(), 13);
/// ```
#[macro_export]
macro_rules! record {
    (@omit_empty) => {
        false
    };
    (@omit_empty omit_empty) => {
        true
    };
    (@field $self:ident $index:expr;) => {{
        let _ = $index;
        ::std::option::Option::None
    }};
    (@field $self:ident $index:expr; $head:ident $(, $rest:ident)*) => {
        match $index {
            0 => ::std::option::Option::Some(&$self.$head as &dyn $crate::Measure),
            n => $crate::record!(@field $self n - 1; $($rest),*),
        }
    };
    ($ty:ty { $($field:ident => $name:literal $([$flag:ident])?),* $(,)? }) => {
        impl $crate::Measure for $ty {
            fn kind(&self) -> $crate::Kind<'_> {
                $crate::Kind::Record(self)
            }
        }

        impl $crate::Record for $ty {
            fn describe(&self) -> ::std::vec::Vec<$crate::FieldDescriptor> {
                let fields: &[(&'static str, bool)] = &[
                    $(($name, $crate::record!(@omit_empty $($flag)?))),*
                ];
                fields
                    .iter()
                    .enumerate()
                    .map(|(index, &(name, omit_empty))| {
                        $crate::FieldDescriptor::new(index, name).omit_empty(omit_empty)
                    })
                    .collect()
            }

            fn field(&self, index: usize) -> ::std::option::Option<&dyn $crate::Measure> {
                $crate::record!(@field self index; $($field),*)
            }
        }
    };
}
