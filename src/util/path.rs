use crate::prelude::*;
use easy_ext::ext;
use std::path::Path;

#[ext(PathExt)]
pub(crate) impl Path {
    fn to_utf8(&self) -> Result<&Utf8Path> {
        Utf8Path::from_path(self).with_context(|| format!("Path is not UTF8: {self:?}"))
    }
}

const FALLBACK_FILE_NAME: &str = "attachment";

/// Reduces a user-supplied file name to its last path component, so that it
/// can't escape the directory it is joined to.
pub(crate) fn sanitize_file_name(name: &str) -> &str {
    Utf8Path::new(name)
        .file_name()
        .unwrap_or(FALLBACK_FILE_NAME)
}
