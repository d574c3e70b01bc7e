use std::future::Future;

use log::{error, warn};

use super::transport::RET_INVALID_CODE;
use super::FetchResult;

/// Valid records plus the codes the remote rejected, accumulated over one
/// logical batch operation and discarded with it.
#[derive(Debug)]
pub struct ChunkedOutcome<T> {
    pub records: Vec<T>,
    pub invalid_codes: Vec<String>,
}

impl<T> Default for ChunkedOutcome<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            invalid_codes: Vec::new(),
        }
    }
}

/// Splits `codes` into groups of at most `max_per_call`, preserving order and
/// covering every code exactly once. Empty input yields no chunks.
pub fn chunk_codes(codes: &[String], max_per_call: usize) -> Vec<Vec<String>> {
    codes
        .chunks(max_per_call.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Runs `call` over order-preserving chunks of `codes`, isolating invalid
/// codes instead of failing the whole batch.
///
/// A chunk that fails with the invalid-code status falls back to one probe
/// per code: probes that return records keep them, probes that come back
/// empty or repeat the invalid-code status mark the code invalid, and every
/// other failure aborts the batch. Each `call` invocation is expected to go
/// through the dispatch queue, so probing obeys the same throttle as any
/// other call.
pub async fn run_chunked<T, F, Fut>(
    codes: &[String],
    max_per_call: usize,
    mut call: F,
) -> FetchResult<ChunkedOutcome<T>>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = FetchResult<Vec<T>>>,
{
    let mut outcome = ChunkedOutcome::default();

    for chunk in chunk_codes(codes, max_per_call) {
        match call(chunk.clone()).await {
            Ok(records) => outcome.records.extend(records),
            Err(err) if err.remote_ret() == Some(RET_INVALID_CODE) => {
                warn!(
                    "chunk contains an invalid code, probing individually: {} ({err})",
                    chunk.join(", ")
                );
                probe_chunk(&chunk, &mut call, &mut outcome).await?;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(outcome)
}

async fn probe_chunk<T, F, Fut>(
    chunk: &[String],
    call: &mut F,
    outcome: &mut ChunkedOutcome<T>,
) -> FetchResult<()>
where
    F: FnMut(Vec<String>) -> Fut,
    Fut: Future<Output = FetchResult<Vec<T>>>,
{
    for code in chunk {
        match call(vec![code.clone()]).await {
            Ok(records) if !records.is_empty() => outcome.records.extend(records),
            Ok(_) => {
                warn!("no data returned, marking code invalid: {code}");
                outcome.invalid_codes.push(code.clone());
            }
            Err(err) if err.remote_ret() == Some(RET_INVALID_CODE) => {
                warn!("confirmed invalid code: {code}");
                outcome.invalid_codes.push(code.clone());
            }
            // Auth, quota and malformed-request failures are systemic, not
            // per-code; stop probing and surface them.
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

/// Issues one call per request, strictly sequentially, converting per-item
/// failures into empty placeholders so the result stays positional: the
/// caller always gets exactly `requests.len()` entries back.
pub async fn collect_series<T, R, F, Fut>(requests: Vec<R>, mut call: F) -> Vec<Vec<T>>
where
    R: std::fmt::Debug,
    F: FnMut(R) -> Fut,
    Fut: Future<Output = FetchResult<Vec<T>>>,
{
    let mut results = Vec::with_capacity(requests.len());
    for request in requests {
        let label = format!("{request:?}");
        match call(request).await {
            Ok(records) => results.push(records),
            Err(err) => {
                error!("batch item {label} failed, recording empty series: {err}");
                results.push(Vec::new());
            }
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crate::error::AppError;
    use serde_json::Value;

    use super::*;

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn invalid_code_error() -> AppError {
        AppError::remote(RET_INVALID_CODE, "code invalid", Value::Null)
    }

    #[test]
    fn chunking_covers_every_code_in_order() {
        let input = codes(&["a", "b", "c", "d", "e", "f", "g"]);
        let chunks = chunk_codes(&input, 3);

        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|chunk| chunk.len() <= 3));
        let rejoined: Vec<String> = chunks.into_iter().flatten().collect();
        assert_eq!(rejoined, input);
    }

    #[test]
    fn chunk_count_is_the_ceiling_of_the_division() {
        assert_eq!(chunk_codes(&codes(&["a"]), 5).len(), 1);
        assert_eq!(chunk_codes(&codes(&["a", "b", "c", "d", "e"]), 5).len(), 1);
        assert_eq!(
            chunk_codes(&codes(&["a", "b", "c", "d", "e", "f"]), 5).len(),
            2
        );
        assert!(chunk_codes(&[], 5).is_empty());
    }

    #[tokio::test]
    async fn clean_chunks_accumulate_without_probing() {
        let calls = RefCell::new(0);
        let outcome = run_chunked(&codes(&["a", "b", "c"]), 2, |chunk| {
            *calls.borrow_mut() += 1;
            async move { Ok(chunk) }
        })
        .await
        .unwrap();

        assert_eq!(*calls.borrow(), 2);
        assert_eq!(outcome.records, codes(&["a", "b", "c"]));
        assert!(outcome.invalid_codes.is_empty());
    }

    #[tokio::test]
    async fn invalid_code_is_isolated_and_valid_records_survive() {
        let input = codes(&["a", "b", "BAD", "d", "e"]);
        let outcome = run_chunked(&input, 5, |chunk| async move {
            if chunk.iter().any(|c| c == "BAD") {
                Err(invalid_code_error())
            } else {
                Ok(chunk)
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome.records, codes(&["a", "b", "d", "e"]));
        assert_eq!(outcome.invalid_codes, codes(&["BAD"]));
    }

    #[tokio::test]
    async fn empty_probe_results_mark_the_code_invalid() {
        let input = codes(&["a", "GHOST"]);
        let outcome = run_chunked(&input, 5, |chunk| async move {
            if chunk.len() > 1 {
                // Batched phase: force the probing fallback.
                Err(invalid_code_error())
            } else if chunk[0] == "GHOST" {
                Ok(Vec::new())
            } else {
                Ok(chunk)
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome.records, codes(&["a"]));
        assert_eq!(outcome.invalid_codes, codes(&["GHOST"]));
    }

    #[tokio::test]
    async fn systemic_errors_during_probing_propagate() {
        let input = codes(&["a", "b"]);
        let result: FetchResult<ChunkedOutcome<String>> = run_chunked(&input, 5, |chunk| async move {
            if chunk.len() > 1 {
                Err(invalid_code_error())
            } else {
                // Auth failure on the first probe must abort the batch.
                Err(AppError::remote(402, "token invalid", Value::Null))
            }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.remote_ret(), Some(402));
    }

    #[tokio::test]
    async fn non_invalid_chunk_errors_propagate_without_probing() {
        let calls = RefCell::new(0);
        let result: FetchResult<ChunkedOutcome<String>> =
            run_chunked(&codes(&["a", "b"]), 5, |_chunk| {
                *calls.borrow_mut() += 1;
                async { Err(AppError::remote(605, "rate limited", Value::Null)) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(*calls.borrow(), 1);
    }

    #[tokio::test]
    async fn failed_series_items_become_empty_placeholders() {
        let requests = codes(&["a", "b", "c", "d"]);
        let results = collect_series(requests, |code| async move {
            if code == "c" {
                Err(AppError::message("transport down"))
            } else {
                Ok(vec![code])
            }
        })
        .await;

        assert_eq!(results.len(), 4);
        assert_eq!(results[0], vec!["a".to_string()]);
        assert_eq!(results[1], vec!["b".to_string()]);
        assert!(results[2].is_empty());
        assert_eq!(results[3], vec!["d".to_string()]);
    }
}
