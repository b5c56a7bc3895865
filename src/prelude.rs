pub(crate) use crate::util::error::ResultExt as _;
pub(crate) use crate::util::path::PathExt as _;
pub(crate) use anyhow::{ensure, Context as _};
pub(crate) use camino::{Utf8Path, Utf8PathBuf};
pub(crate) use fs_err::tokio as fs;
pub(crate) use itertools::Itertools as _;
pub(crate) use tracing::{debug, error, info, info_span, instrument, warn, Instrument as _};

pub(crate) type Result<T = (), E = anyhow::Error> = std::result::Result<T, E>;
