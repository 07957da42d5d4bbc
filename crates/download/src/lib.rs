// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

//! Fetches a batch of [`FileTaskItem`]s over HTTP on a private,
//! single-threaded cooperative event loop -- one `reqwest::Client`,
//! many in-flight requests, no thread-per-download. Exposed as just
//! another [`task::TaskHandle`]-driven task so callers don't need to
//! know it isn't a local file copy underneath.

mod error;
mod item;

pub use error::{AuthKind, AuthenticationRequiredError, DownloadError};
pub use item::{Credential, FileTaskItem, FileTaskResult};

use std::{collections::HashSet, sync::Arc};

use sha1::{Digest, Sha1};
use task::{FileTaskError, Progress, TaskHandle};
use tokio::io::AsyncWriteExt;
use url::Url;

/// Builds a per-host proxy URL, or `None` to go direct. Mirrors the
/// "proxy factory" the spec describes as an input alongside the item
/// list.
pub type ProxyFactory = Arc<dyn Fn(&Url) -> Option<Url> + Send + Sync>;

pub struct DownloadFileTask {
    items: Vec<FileTaskItem>,
    proxy_factory: Option<ProxyFactory>,
}

impl DownloadFileTask {
    pub fn new(items: Vec<FileTaskItem>, proxy_factory: Option<ProxyFactory>) -> Self {
        Self { items, proxy_factory }
    }

    /// Drives every item to completion (or tolerated skip) on a private
    /// current-thread tokio runtime, reporting an aggregate progress of
    /// `(finished_count * 100 + sum(per_item_percent)) / total_count`.
    pub fn run(mut self, handle: &dyn TaskHandle) -> Result<Vec<FileTaskResult>, FileTaskError> {
        if handle.is_canceled() {
            return Err(FileTaskError::new("download canceled before start"));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FileTaskError::new(e.to_string()))?;

        let items = std::mem::take(&mut self.items);
        let proxy_factory = self.proxy_factory.clone();
        runtime.block_on(run_all(items, proxy_factory, handle))
    }
}

async fn run_all(
    items: Vec<FileTaskItem>,
    proxy_factory: Option<ProxyFactory>,
    handle: &dyn TaskHandle,
) -> Result<Vec<FileTaskResult>, FileTaskError> {
    let total = items.len().max(1);
    let finished = std::sync::atomic::AtomicUsize::new(0);

    let futures = items.into_iter().enumerate().map(|(index, item)| {
        let proxy_factory = proxy_factory.clone();
        let finished = &finished;
        async move {
            let outcome = run_one(index, item, proxy_factory.as_deref(), handle).await;
            let done = finished.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
            handle.report_progress(Progress {
                bytes_done: (done * 100 / total) as u64,
                bytes_total: Some(100),
            });
            outcome
        }
    });

    let results = futures_util::future::join_all(futures).await;
    results
        .into_iter()
        .collect::<Result<Vec<_>, DownloadError>>()
        .map_err(|e| FileTaskError::new(e.to_string()))
}

async fn run_one(
    index: usize,
    mut item: FileTaskItem,
    proxy_factory: Option<&(dyn Fn(&Url) -> Option<Url> + Send + Sync)>,
    handle: &dyn TaskHandle,
) -> Result<FileTaskResult, DownloadError> {
    if !handle.is_canceled() {
        handle.wait_on_resume();
    }
    if handle.is_canceled() {
        // Pause is not supported for network transfers; a pause request
        // auto-converts to cancel with an explanatory error.
        return Err(DownloadError::PauseNotSupported);
    }

    let mut visited = HashSet::new();
    visited.insert(item.source.clone());

    loop {
        let client = build_client(&item.source, proxy_factory)?;

        let mut request = client.get(item.source.clone());
        if let Some(credential) = &item.credential {
            request = request.basic_auth(&credential.username, Some(&credential.password));
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| item.source.join(s).ok());

            let _ = tokio::fs::remove_file(&item.target).await;

            let Some(next) = location else {
                return Err(DownloadError::RedirectLoop(item.source.clone()));
            };
            if !visited.insert(next.clone()) {
                return Err(DownloadError::RedirectLoop(next));
            }
            item.source = next;
            continue;
        }

        if status.as_u16() == 401 {
            if let Some(credential) = item.credential.take() {
                drop(credential);
                continue;
            }
            let realm = response
                .headers()
                .get(reqwest::header::WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());
            return Err(DownloadError::AuthenticationRequired(AuthenticationRequiredError {
                kind: AuthKind::Server,
                realm,
                host: item.source.host_str().map(|h| h.to_string()),
            }));
        }

        if status.as_u16() == 407 {
            return Err(DownloadError::AuthenticationRequired(AuthenticationRequiredError {
                kind: AuthKind::Proxy,
                realm: None,
                host: item.source.host_str().map(|h| h.to_string()),
            }));
        }

        if status.as_u16() == 404 && item.is_tolerant_missing() {
            log::warn!("tolerating missing {}", item.source);
            return Ok(FileTaskResult {
                item_index: index,
                bytes_written: 0,
                sha1: [0u8; 20],
                skipped: true,
            });
        }

        let response = response.error_for_status()?;
        return write_body(index, item, response, handle).await;
    }
}

async fn write_body(
    index: usize,
    item: FileTaskItem,
    response: reqwest::Response,
    handle: &dyn TaskHandle,
) -> Result<FileTaskResult, DownloadError> {
    use futures_util::StreamExt;

    let total = response.content_length();
    let mut out = tokio::fs::File::create(&item.target).await?;
    let mut hasher = Sha1::new();
    let mut bytes_written = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        if handle.is_canceled() {
            drop(out);
            let _ = tokio::fs::remove_file(&item.target).await;
            return Err(DownloadError::PauseNotSupported);
        }

        let chunk = chunk?;
        out.write_all(&chunk).await?;
        hasher.update(&chunk);
        bytes_written += chunk.len() as u64;

        handle.report_progress(Progress {
            bytes_done: bytes_written,
            bytes_total: total,
        });
    }
    out.flush().await?;

    let sha1: [u8; 20] = hasher.finalize().into();

    if let Some(expected) = item.expected_sha1 {
        if expected != sha1 {
            return Err(DownloadError::ChecksumMismatch {
                url: item.source,
                expected: hex::encode(expected),
                found: hex::encode(sha1),
            });
        }
    }

    Ok(FileTaskResult {
        item_index: index,
        bytes_written,
        sha1,
        skipped: false,
    })
}

fn build_client(
    url: &Url,
    proxy_factory: Option<&(dyn Fn(&Url) -> Option<Url> + Send + Sync)>,
) -> Result<reqwest::Client, DownloadError> {
    let mut builder = reqwest::Client::builder().redirect(reqwest::redirect::Policy::none());

    if let Some(factory) = proxy_factory {
        if let Some(proxy_url) = factory(url) {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }
    }

    Ok(builder.build()?)
}

/// Whether `a` and `b` share scheme, host, and effective port.
pub fn is_same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme() && a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tolerant_missing_only_matches_updates_xml() {
        let item = FileTaskItem::new(
            Url::parse("https://example.com/repo/Updates.xml").unwrap(),
            "/tmp/out",
        );
        assert!(item.is_tolerant_missing());

        let other = FileTaskItem::new(Url::parse("https://example.com/repo/pkg.7z").unwrap(), "/tmp/out");
        assert!(!other.is_tolerant_missing());
    }

    #[test]
    fn same_origin_checks_scheme_host_and_port() {
        let a = Url::parse("https://example.com/a").unwrap();
        let b = Url::parse("https://example.com:443/b").unwrap();
        let c = Url::parse("https://evil.example/b").unwrap();
        assert!(is_same_origin(&a, &b));
        assert!(!is_same_origin(&a, &c));
    }
}
