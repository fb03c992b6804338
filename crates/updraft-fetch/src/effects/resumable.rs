//! Resumable download driver.
//!
//! Runs the resume-or-restart protocol from `updraft-resume` against an
//! [`HttpClient`], a [`StateStore`] and the local file system. The resume
//! record is keyed by the source URL and saved before any body bytes are
//! written, so a download interrupted at any point can be continued.

use std::path::{Path, PathBuf};

use futures_util::TryStreamExt;
use sha2::{Digest, Sha256};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};
use updraft_resume::{
    Reconciliation, RequestPlan, ResumableDownload, plan_request, reconcile,
};
use updraft_store::{Records, StateStore, StoreError};

use super::http::{HttpClient, HttpResponse};
use crate::data::{FetchPhase, Progress, ResumeOptions};
use crate::error::{FetchError, Result};

const PART_SUFFIX: &str = "part";
const HASH_BUFFER: usize = 64 * 1024;

/// Fetcher that resumes interrupted downloads with HTTP range requests.
pub struct ResumableFetcher<C: HttpClient, S: StateStore> {
    client:  C,
    records: Records<S>,
    options: ResumeOptions,
}

/// Where the body of the current attempt goes.
struct Attempt<E> {
    response:     HttpResponse<E>,
    state:        ResumableDownload,
    resumed_from: u64,
}

impl<C: HttpClient, S: StateStore> ResumableFetcher<C, S> {
    pub fn new(client: C, store: S) -> Self {
        Self {
            client,
            records: Records::new(store),
            options: ResumeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResumeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn records(&self) -> &Records<S> { &self.records }

    /// Partial file used for `destination` when no record names one.
    pub fn partial_path(destination: &Path) -> PathBuf {
        let mut name = destination.file_name().unwrap_or_default().to_os_string();
        name.push(".");
        name.push(PART_SUFFIX);
        destination.with_file_name(name)
    }

    /// Downloads `url` to `destination`, resuming a previous attempt when the
    /// stored record and the server agree the resource is unchanged.
    ///
    /// On success the partial file is moved to `destination` and the resume
    /// record is deleted. On transport errors the record and partial file are
    /// kept for the next attempt.
    pub async fn fetch(&self, url: &str, destination: &Path) -> Result<PathBuf> {
        let prior = self.load_prior(url)?;
        let location = match &prior {
            Some(state) => state.file_location().to_path_buf(),
            None => Self::partial_path(destination),
        };

        let attempt = self.connect(url, prior, &location).await?;
        let total = attempt.response.meta.entity_length();
        let written = self.write_body(attempt, total).await?;

        if let Some(expected) = total
            && written != expected
        {
            return Err(FetchError::Incomplete {
                expected,
                actual: written,
            });
        }

        self.verify(url, &location, written, total).await?;

        self.notify(Progress::new(FetchPhase::Committing, written, total, 0));
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(FetchError::io(parent))?;
        }
        fs::rename(&location, destination)
            .await
            .map_err(FetchError::io(destination))?;
        self.records.discard(url)?;

        info!(url, destination = %destination.display(), bytes = written, "download complete");
        self.notify(Progress::new(FetchPhase::Completed, written, total, 0));
        Ok(destination.to_path_buf())
    }

    fn load_prior(&self, url: &str) -> Result<Option<ResumableDownload>> {
        match self.records.load(url) {
            Ok(prior) => Ok(prior),
            Err(StoreError::Codec(e)) => {
                warn!(url, error = %e, "discarding unreadable resume record");
                self.records.discard(url)?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Issues requests until one yields a body to write. At most one restart
    /// with a fresh request is attempted.
    async fn connect(
        &self,
        url: &str,
        mut prior: Option<ResumableDownload>,
        location: &Path,
    ) -> Result<Attempt<C::Error>> {
        let policy = &self.options.policy;
        let current_len = file_len(location).await?;
        let mut plan = plan_request(prior.as_ref(), current_len, policy);

        loop {
            self.notify(Progress::new(FetchPhase::Connecting, 0, None, plan.offset()));
            match &plan {
                RequestPlan::Ranged { offset, validator } => {
                    debug!(url, offset, validator = ?validator, "requesting remaining bytes");
                }
                RequestPlan::Fresh { reason } => debug!(url, %reason, "requesting whole file"),
            }

            let mut headers = self.options.headers.to_vec();
            headers.extend(plan.headers());
            let response = self
                .client
                .get(url, &headers)
                .await
                .map_err(FetchError::transport)?;

            match reconcile(&plan, prior.as_ref(), &response.meta, policy) {
                Reconciliation::Continue { offset, state } => {
                    info!(url, offset, "resuming download");
                    self.records.save(url, &state)?;
                    return Ok(Attempt {
                        response,
                        state,
                        resumed_from: offset,
                    });
                }
                Reconciliation::Restart {
                    reason,
                    reuse_body: true,
                } => {
                    if matches!(plan, RequestPlan::Ranged { .. }) {
                        info!(url, %reason, "restarting download from zero");
                    }
                    truncate(location).await?;
                    let state = ResumableDownload::new(Some(response.meta.clone()), location)?;
                    self.records.save(url, &state)?;
                    return Ok(Attempt {
                        response,
                        state,
                        resumed_from: 0,
                    });
                }
                Reconciliation::Restart {
                    reason,
                    reuse_body: false,
                } => {
                    if matches!(plan, RequestPlan::Fresh { .. }) {
                        return Err(FetchError::HttpStatus {
                            status: response.meta.status(),
                            url:    url.to_string(),
                        });
                    }
                    info!(url, %reason, "discarding partial download");
                    drop(response);
                    remove_if_exists(location).await?;
                    self.records.discard(url)?;
                    prior = None;
                    plan = RequestPlan::Fresh { reason };
                }
                Reconciliation::Failed { status } => {
                    warn!(url, status, "server refused download; keeping resume record");
                    return Err(FetchError::HttpStatus {
                        status,
                        url: url.to_string(),
                    });
                }
            }
        }
    }

    async fn write_body(&self, attempt: Attempt<C::Error>, total: Option<u64>) -> Result<u64> {
        let Attempt {
            response,
            state,
            resumed_from,
        } = attempt;
        let location = state.file_location();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(location)
            .await
            .map_err(FetchError::io(location))?;

        let mut written = resumed_from;
        self.notify(Progress::new(FetchPhase::Downloading, written, total, resumed_from));

        let mut body = response.body;
        let streamed = loop {
            match body.try_next().await {
                Ok(Some(chunk)) => {
                    file.write_all(&chunk).await.map_err(FetchError::io(location))?;
                    written += chunk.len() as u64;
                    self.notify(Progress::new(FetchPhase::Downloading, written, total, resumed_from));
                }
                Ok(None) => break Ok(()),
                Err(e) => break Err(FetchError::transport(e)),
            }
        };

        // The last write may still be queued on tokio's blocking pool; the
        // partial file must hold every counted byte before a retry measures it.
        file.flush().await.map_err(FetchError::io(location))?;
        file.sync_all().await.map_err(FetchError::io(location))?;

        if let Err(e) = streamed {
            debug!(location = %location.display(), written, "transfer interrupted; partial file kept");
            return Err(e);
        }
        Ok(written)
    }

    async fn verify(&self, url: &str, location: &Path, written: u64, total: Option<u64>) -> Result<()> {
        let Some(expected) = self.options.checksum else {
            return Ok(());
        };

        self.notify(Progress::new(FetchPhase::Verifying, written, total, 0));
        let actual = sha256_file(location).await?;
        if actual != expected {
            warn!(url, "checksum mismatch; discarding download");
            remove_if_exists(location).await?;
            self.records.discard(url)?;
            return Err(FetchError::ChecksumMismatch {
                expected: hex::encode(expected),
                actual:   hex::encode(actual),
            });
        }
        Ok(())
    }

    fn notify(&self, progress: Progress) {
        if let Some(ref callback) = self.options.on_progress {
            callback(&progress);
        }
    }
}

async fn file_len(path: &Path) -> Result<u64> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(metadata.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(FetchError::io(path)(e)),
    }
}

async fn truncate(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(FetchError::io(parent))?;
    }
    File::create(path).await.map_err(FetchError::io(path))?;
    Ok(())
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FetchError::io(path)(e)),
    }
}

async fn sha256_file(path: &Path) -> Result<[u8; 32]> {
    let mut file = File::open(path).await.map_err(FetchError::io(path))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_BUFFER];

    loop {
        let n = file.read(&mut buffer).await.map_err(FetchError::io(path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hasher.finalize().into())
}
