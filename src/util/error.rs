use easy_ext::ext;
use std::fmt;
use tracing::warn;

#[ext(ResultExt)]
pub(crate) impl<T, E> Result<T, E> {
    fn err_into<U>(self) -> Result<T, U>
    where
        E: Into<U>,
    {
        self.map_err(Into::into)
    }

    /// Swallows the error, leaving only a warning in the logs.
    fn warn_err(self, message: &str) -> Option<T>
    where
        E: fmt::Debug,
    {
        self.map_err(|err| warn!("{message}: {err:?}")).ok()
    }
}
