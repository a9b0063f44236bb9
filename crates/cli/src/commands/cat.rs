//! cat command - Write item contents to stdout
//!
//! The item is streamed; it is never buffered whole in memory.

use clap::Args;
use tokio::io::{self, AsyncWriteExt};

use sw_core::{Error, Item};

use super::{close_location, resolve_item};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Write item contents to stdout
#[derive(Args, Debug)]
pub struct CatArgs {
    /// Profile to dial
    pub profile: String,

    /// Item URL, e.g. s3://s3-us-east-1.amazonaws.com/bucket/key
    pub url: String,
}

/// Execute the cat command
pub async fn execute(args: CatArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (location, item) = match resolve_item(&args.profile, &args.url, &formatter).await {
        Ok(resolved) => resolved,
        Err(code) => return code,
    };

    let code = match copy_to(item.as_ref(), &mut io::stdout()).await {
        Ok(bytes) => {
            tracing::debug!(url = %args.url, bytes, "streamed item");
            ExitCode::Success
        }
        Err(e) => formatter.fail(&format!("Failed to read {}", args.url), &e),
    };

    close_location(location.as_ref(), &formatter).await;
    code
}

/// Stream an item into `writer`, returning the byte count
async fn copy_to<W>(item: &dyn Item, writer: &mut W) -> sw_core::Result<u64>
where
    W: io::AsyncWrite + Unpin + ?Sized,
{
    let mut reader = item.open().await?;
    let bytes = io::copy(&mut reader, writer).await.map_err(Error::Io)?;
    writer.flush().await.map_err(Error::Io)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use jiff::Timestamp;
    use std::io::Cursor;
    use sw_core::{ItemReader, Metadata, Result};
    use url::Url;

    struct BytesItem(&'static [u8]);

    #[async_trait]
    impl Item for BytesItem {
        fn id(&self) -> &str {
            "bytes"
        }
        fn name(&self) -> &str {
            "bytes"
        }
        fn url(&self) -> Url {
            sw_core::blank_url()
        }
        fn size(&self) -> Result<i64> {
            Ok(self.0.len() as i64)
        }
        async fn open(&self) -> Result<ItemReader> {
            Ok(Box::pin(Cursor::new(self.0)))
        }
        fn last_mod(&self) -> Result<Timestamp> {
            Ok(Timestamp::UNIX_EPOCH)
        }
        fn etag(&self) -> Result<String> {
            Ok(String::new())
        }
        fn metadata(&self) -> Result<Metadata> {
            Ok(Metadata::new())
        }
    }

    #[tokio::test]
    async fn test_copy_to() {
        let mut out = Vec::new();
        let bytes = copy_to(&BytesItem(b"hello world"), &mut out).await.unwrap();
        assert_eq!(bytes, 11);
        assert_eq!(out, b"hello world");
    }

    #[tokio::test]
    async fn test_copy_unresolved_item() {
        let item: Option<BytesItem> = None;
        let mut out = Vec::new();
        let err = copy_to(&item, &mut out).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(out.is_empty());
    }
}
