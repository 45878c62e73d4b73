//! Pagination over one prefix's listing.
//!
//! Pagination within a prefix is serial: page N+1 is only requested
//! with the continuation token returned by page N. Parallelism happens
//! across prefixes, one level up in [`crate::batch`].

use bk_error::Result;
use tracing::debug;

use crate::store::ObjectStore;

/// Drain one prefix's listing to completion.
///
/// Issues `list_page` calls until a page omits the continuation token,
/// accumulating object keys and, when `delimiter` is supplied, one
/// level of common sub-prefixes.
pub async fn drain_listing<S>(
    store: &S,
    bucket: &str,
    prefix: &str,
    delimiter: Option<&str>,
) -> Result<(Vec<String>, Vec<String>)>
where
    S: ObjectStore + ?Sized,
{
    let mut keys = Vec::new();
    let mut sub_prefixes = Vec::new();
    let mut continuation_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = store
            .list_page(bucket, prefix, delimiter, continuation_token.as_deref())
            .await?;
        pages += 1;

        keys.extend(page.keys);
        sub_prefixes.extend(page.common_prefixes);

        match page.next_continuation_token {
            Some(token) => continuation_token = Some(token),
            None => break,
        }
    }

    debug!(
        prefix = prefix,
        pages,
        keys = keys.len(),
        sub_prefixes = sub_prefixes.len(),
        "Drained listing"
    );

    Ok((keys, sub_prefixes))
}

/// List all object keys under a single prefix.
pub async fn list_keys_by_prefix<S>(store: &S, bucket: &str, prefix: &str) -> Result<Vec<String>>
where
    S: ObjectStore + ?Sized,
{
    let (keys, _) = drain_listing(store, bucket, prefix, None).await?;
    Ok(keys)
}

/// List the immediate child namespace segments under a single prefix.
///
/// Uses a `/` delimiter, so only one level of sub-namespace is
/// returned, never leaf keys.
pub async fn list_prefixes_by_prefix<S>(store: &S, bucket: &str, prefix: &str) -> Result<Vec<String>>
where
    S: ObjectStore + ?Sized,
{
    let (_, sub_prefixes) = drain_listing(store, bucket, prefix, Some("/")).await?;
    Ok(sub_prefixes)
}
