//! Bounded-concurrency fan-out for batched requests.
//!
//! The files API has no multi-get, so a batch of single-file gets is issued
//! concurrently, up to `max_concurrent` at a time.

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;

use crate::error::Result;

/// Run `fetch` for every key with at most `max_concurrent` requests in flight.
///
/// Results come back in the order of `keys`. The first error aborts the batch.
///
/// # Example
///
/// ```ignore
/// let files = fetch_all(ids, |id| async move { client.get_file(token, &id).await }, 8).await?;
/// ```
pub async fn fetch_all<K, T, F, Fut>(keys: Vec<K>, fetch: F, max_concurrent: usize) -> Result<Vec<T>>
where
    F: Fn(K) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let total = keys.len();
    let limit = max_concurrent.max(1);
    debug!("Fetching {} items with max {} concurrent", total, limit);

    let mut results: Vec<Option<T>> = (0..total).map(|_| None).collect();
    let mut in_flight = FuturesUnordered::new();
    let mut pending = keys.into_iter().enumerate();

    let launch = |(position, key): (usize, K)| {
        let fut = fetch(key);
        async move { (position, fut.await) }
    };

    for item in pending.by_ref().take(limit) {
        in_flight.push(launch(item));
    }

    while let Some((position, result)) = in_flight.next().await {
        results[position] = Some(result?);

        if let Some(item) = pending.next() {
            in_flight.push(launch(item));
        }
    }

    Ok(results.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_fetch_all_empty() {
        let result: Result<Vec<String>> =
            fetch_all(Vec::<usize>::new(), |_k| async { Ok(String::new()) }, 10).await;

        assert!(result.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_preserves_key_order() {
        let result: Result<Vec<String>> = fetch_all(
            vec![3u64, 1, 2],
            |k| async move {
                // Later keys finish first.
                tokio::time::sleep(tokio::time::Duration::from_millis(k * 5)).await;
                Ok(format!("item-{}", k))
            },
            10,
        )
        .await;

        assert_eq!(result.unwrap(), vec!["item-3", "item-1", "item-2"]);
    }

    #[tokio::test]
    async fn test_fetch_all_respects_concurrency() {
        let concurrent_count = Arc::new(AtomicUsize::new(0));
        let max_observed = Arc::new(AtomicUsize::new(0));

        let result: Result<Vec<usize>> = fetch_all(
            vec![1, 2, 3, 4, 5],
            |k| {
                let cc = concurrent_count.clone();
                let mo = max_observed.clone();
                async move {
                    let current = cc.fetch_add(1, Ordering::SeqCst) + 1;
                    mo.fetch_max(current, Ordering::SeqCst);

                    tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;

                    cc.fetch_sub(1, Ordering::SeqCst);
                    Ok(k)
                }
            },
            2,
        )
        .await;

        assert_eq!(result.unwrap().len(), 5);
        assert!(max_observed.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_fetch_all_propagates_errors() {
        let result: Result<Vec<String>> = fetch_all(
            vec![1, 2, 3],
            |k| async move {
                if k == 2 {
                    Err(crate::error::ApiError::ServerError("test error".to_string()).into())
                } else {
                    Ok(format!("item-{}", k))
                }
            },
            10,
        )
        .await;

        assert!(result.is_err());
    }
}
