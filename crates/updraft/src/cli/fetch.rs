use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Args;
use tracing::{debug, info};
use updraft_fetch::{ReqwestClient, ResumableFetcher, ResumeOptions};
use updraft_resume::{ValidatorKind, ValidatorPolicy};
use updraft_store::DirStore;
use url::Url;

use super::tracker::ProgressTracker;

#[derive(Clone, Debug, Args)]
pub struct FetchArg {
    /// URL to download
    pub url: String,

    /// Destination file, defaults to the last path segment of the URL
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory holding resume records, defaults to ~/.updraft/state
    #[arg(long)]
    pub state_dir: Option<PathBuf>,

    /// Expected SHA-256 of the finished file, hex encoded
    #[arg(long)]
    pub sha256: Option<String>,

    /// Compare Last-Modified before ETag when deciding to resume
    #[arg(long)]
    pub prefer_last_modified: bool,

    /// Accept an unchanged Content-Length when no other validator exists
    #[arg(long)]
    pub match_length: bool,

    /// Extra request header as `Name: value`
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Do not draw a progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

impl FetchArg {
    pub async fn run(self) -> anyhow::Result<()> {
        let url = Url::parse(&self.url).with_context(|| format!("invalid url `{}`", self.url))?;
        let output = match &self.output {
            Some(output) => output.clone(),
            None => default_output(&url)?,
        };
        let state_dir = self.state_dir.clone().unwrap_or_else(default_state_dir);
        debug!(state_dir = %state_dir.display(), "using resume records");

        let mut options = self.options()?;
        let tracker = (!self.quiet).then(|| ProgressTracker::new(output.display().to_string()));
        if let Some(tracker) = tracker.clone() {
            options = options.on_progress(move |progress| tracker.update(progress));
        }

        let client = ReqwestClient::new().context("failed to build http client")?;
        let fetcher = ResumableFetcher::new(client, DirStore::new(state_dir)).with_options(options);

        match fetcher.fetch(url.as_str(), &output).await {
            Ok(path) => {
                if let Some(tracker) = &tracker {
                    tracker.finish(Some(format!("saved {}", path.display())));
                }
                info!(path = %path.display(), "saved");
                Ok(())
            }
            Err(e) => {
                if let Some(tracker) = &tracker {
                    tracker.abandon();
                }
                Err(e).with_context(|| format!("failed to download {url}"))
            }
        }
    }

    fn options(&self) -> anyhow::Result<ResumeOptions> {
        let mut policy = if self.prefer_last_modified {
            ValidatorPolicy::new([ValidatorKind::LastModified, ValidatorKind::EntityTag])
        } else {
            ValidatorPolicy::default()
        };
        if self.match_length {
            policy = policy.with(ValidatorKind::ContentLength);
        }

        let mut options = ResumeOptions::default().policy(policy);
        if let Some(digest) = &self.sha256 {
            options = options.checksum_hex(digest)?;
        }
        for header in &self.headers {
            let Some((name, value)) = header.split_once(':') else {
                bail!("header `{header}` is not of the form `Name: value`");
            };
            options = options.header(name.trim(), value.trim());
        }

        Ok(options)
    }
}

fn default_output(url: &Url) -> anyhow::Result<PathBuf> {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(PathBuf::from)
        .with_context(|| format!("cannot name a file after `{url}`, pass -o"))
}

fn default_state_dir() -> PathBuf {
    home::home_dir()
        .map(|home| home.join(".updraft").join("state"))
        .unwrap_or_else(|| PathBuf::from(".updraft-state"))
}
