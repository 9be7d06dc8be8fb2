/// generates a `Context` trait for the given error type along with the
/// implementations for `Result` and `Option`.
///
/// the error type must provide `new()`, `context(cxt)` and `source(src)`
/// builder methods.
#[macro_export]
macro_rules! context_trait {
    ($e:ty) => {
        pub trait Context<T, E> {
            fn context<C>(self, cxt: C) -> std::result::Result<T, $e>
            where
                C: Into<String>;
        }

        impl<T, E> Context<T, E> for std::result::Result<T, E>
        where
            E: Into<Box<dyn std::error::Error + Send + Sync>>
        {
            fn context<C>(self, cxt: C) -> std::result::Result<T, $e>
            where
                C: Into<String>
            {
                match self {
                    Ok(v) => Ok(v),
                    Err(err) => Err(<$e>::new()
                        .context(cxt)
                        .source(err))
                }
            }
        }

        impl<T> Context<T, ()> for std::option::Option<T> {
            fn context<C>(self, cxt: C) -> std::result::Result<T, $e>
            where
                C: Into<String>
            {
                match self {
                    Some(v) => Ok(v),
                    None => Err(<$e>::new().context(cxt))
                }
            }
        }
    };
}
