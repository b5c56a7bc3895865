mod apply;
mod serve;

use crate::prelude::*;
use async_trait::async_trait;

pub use apply::*;
pub use serve::*;

#[async_trait]
pub(crate) trait Cmd {
    async fn run(self) -> Result;
}
