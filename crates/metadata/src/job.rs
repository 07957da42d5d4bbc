// SPDX-FileCopyrightText: Copyright © 2024 Installer Core Contributors
//
// SPDX-License-Identifier: MPL-2.0

use std::{
    collections::{HashMap, HashSet},
    path::PathBuf,
    sync::mpsc,
    time::Duration,
};

use download::{DownloadFileTask, FileTaskItem};
use retry::delay::Fixed;
use task::{Handle, TaskHandle};
use url::Url;

use crate::{
    error::MetadataError,
    repository::{PackagePlan, RepoPlan, Repository},
    state::JobState,
    unzip, xml,
};

pub struct MetadataJob {
    pub repositories: Vec<Repository>,
    pub temp_root: PathBuf,
    pub silent_retries: usize,
    pub retry_backoff: Duration,
    state: JobState,
}

#[derive(Debug, Default)]
pub struct JobOutcome {
    pub plans: HashMap<String, RepoPlan>,
    /// Per-repository directory containing the extracted metadata plus
    /// the `Updates.xml` that described it.
    pub extracted_dirs: HashMap<String, PathBuf>,
}

impl MetadataJob {
    pub fn new(repositories: Vec<Repository>, temp_root: PathBuf) -> Self {
        Self {
            repositories,
            temp_root,
            silent_retries: 4,
            retry_backoff: Duration::from_millis(1500),
            state: JobState::Idle,
        }
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn run(&mut self, handle: &dyn TaskHandle) -> Result<JobOutcome, MetadataError> {
        let mut applied_repo_urls: HashSet<String> =
            self.repositories.iter().map(|r| r.url.to_string()).collect();

        let (plans, xml_by_repo) = loop {
            if handle.is_canceled() {
                self.state = JobState::Failed("canceled".into());
                return Err(MetadataError::Canceled);
            }

            let (plans, xml_by_repo) = self.fetch_and_parse(handle)?;

            let mut changed = false;
            for repo_updates in xml_by_repo.values() {
                for update in &repo_updates.repository_updates {
                    changed |= self.apply_repository_update(update, &mut applied_repo_urls);
                }
            }

            if !changed {
                break (plans, xml_by_repo);
            }
            self.state = JobState::RetryWithNewSources;
        };

        if handle.is_canceled() {
            self.state = JobState::Failed("canceled".into());
            return Err(MetadataError::Canceled);
        }

        self.state = JobState::FetchingArchives;
        let archive_paths = self.fetch_archives(&plans, handle)?;

        self.state = JobState::Extracting;
        let extracted_dirs = self.extract_all(&archive_paths, &xml_by_repo, handle)?;

        self.state = JobState::Done;
        Ok(JobOutcome { plans, extracted_dirs })
    }

    fn fetch_and_parse(
        &mut self,
        handle: &dyn TaskHandle,
    ) -> Result<(HashMap<String, RepoPlan>, HashMap<String, xml::Updates>), MetadataError> {
        self.state = JobState::FetchingXml;

        let mut xml_by_repo = HashMap::new();
        for repo in self.repositories.clone().iter().filter(|r| r.enabled) {
            if handle.is_canceled() {
                return Err(MetadataError::Canceled);
            }
            let body = self.fetch_updates_xml(repo)?;
            xml_by_repo.insert(repo.id.clone(), body);
        }

        self.state = JobState::ParsingXml;

        let mut plans = HashMap::new();
        for (id, updates) in &xml_by_repo {
            let packages = updates
                .package_updates
                .iter()
                .map(|p| PackagePlan {
                    name: p.name.clone(),
                    version: p.remote_version.clone(),
                    expected_sha1: if updates.checksum {
                        p.sha1.as_deref().and_then(decode_sha1)
                    } else {
                        None
                    },
                })
                .collect();
            plans.insert(id.clone(), RepoPlan { packages });
        }

        Ok((plans, xml_by_repo))
    }

    /// Downloads `Updates.xml` with a cache-busting query parameter,
    /// silently retrying transient failures `silent_retries` times with
    /// `retry_backoff` between attempts before surfacing the error.
    fn fetch_updates_xml(&self, repo: &Repository) -> Result<xml::Updates, MetadataError> {
        let attempt = || -> Result<xml::Updates, MetadataError> {
            let bust = uuid::Uuid::new_v4();
            let mut url = repo.url.clone();
            {
                let mut segments = url.path_segments_mut().map_err(|_| {
                    MetadataError::ArchiveFetch(format!("repository url {} cannot be a base", repo.url))
                })?;
                segments.push("Updates.xml");
            }
            url.set_query(Some(&format!("{bust}")));

            let target = self.temp_root.join(format!("{}-updates.xml", repo.id));
            let item = FileTaskItem::new(url, &target);

            let (tx, _rx) = mpsc::channel();
            let task_handle = Handle::new(tx);
            let task = DownloadFileTask::new(vec![item], None);
            task.run(&*task_handle)
                .map_err(|e| MetadataError::ArchiveFetch(e.message.clone()))?;

            let body = std::fs::read_to_string(&target)?;
            xml::parse(&repo.id, &body)
        };

        let delay = Fixed::from_millis(self.retry_backoff.as_millis() as u64).take(self.silent_retries);
        retry::retry(delay, attempt).map_err(|err| MetadataError::XmlFetchExhausted {
            repo: repo.id.clone(),
            message: err.to_string(),
        })
    }

    /// Applies one `RepositoryUpdate`. Returns whether the repository
    /// set actually changed; reapplying an action that would yield the
    /// same set is a no-op so the retry loop above terminates.
    fn apply_repository_update(&mut self, update: &xml::RepositoryUpdate, applied: &mut HashSet<String>) -> bool {
        let Ok(url) = Url::parse(&update.url) else {
            return false;
        };

        match update.action {
            xml::RepositoryAction::Add => {
                if applied.contains(&url.to_string()) {
                    return false;
                }
                applied.insert(url.to_string());
                self.repositories.push(Repository::new(url.to_string(), url));
                true
            }
            xml::RepositoryAction::Remove => {
                let before = self.repositories.len();
                self.repositories.retain(|r| r.url != url);
                self.repositories.len() != before
            }
            xml::RepositoryAction::Replace => {
                let before = self.repositories.len();
                self.repositories.retain(|r| r.url != url);
                let removed = self.repositories.len() != before;
                let added = if applied.insert(url.to_string()) {
                    self.repositories.push(Repository::new(url.to_string(), url));
                    true
                } else {
                    false
                };
                removed || added
            }
        }
    }

    fn fetch_archives(
        &self,
        plans: &HashMap<String, RepoPlan>,
        handle: &dyn TaskHandle,
    ) -> Result<HashMap<(String, String, String), PathBuf>, MetadataError> {
        let mut items = Vec::new();
        let mut keys = Vec::new();

        for repo in &self.repositories {
            let Some(plan) = plans.get(&repo.id) else {
                continue;
            };
            for package in &plan.packages {
                let Ok(mut url) = repo.url.clone().join(&format!("{}/", package.name)) else {
                    continue;
                };
                let Ok(full) = url.join(&format!("{}meta.7z", package.version)) else {
                    continue;
                };
                url = full;

                let target = self
                    .temp_root
                    .join(format!("{}-{}-{}.7z", repo.id, package.name, package.version));

                let mut item = FileTaskItem::new(url, &target);
                item.expected_sha1 = package.expected_sha1;
                items.push(item);
                keys.push((repo.id.clone(), package.name.clone(), package.version.clone()));
            }
        }

        if items.is_empty() {
            return Ok(HashMap::new());
        }
        if handle.is_canceled() {
            return Err(MetadataError::Canceled);
        }

        let (tx, _rx) = mpsc::channel();
        let task_handle = Handle::new(tx);
        let task = DownloadFileTask::new(items, None);
        let results = task
            .run(&*task_handle)
            .map_err(|e| MetadataError::ArchiveFetch(e.message.clone()))?;

        let mut paths = HashMap::new();
        for result in results {
            let key = keys[result.item_index].clone();
            let target = self
                .temp_root
                .join(format!("{}-{}-{}.7z", key.0, key.1, key.2));
            paths.insert(key, target);
        }
        Ok(paths)
    }

    fn extract_all(
        &self,
        archive_paths: &HashMap<(String, String, String), PathBuf>,
        xml_by_repo: &HashMap<String, xml::Updates>,
        handle: &dyn TaskHandle,
    ) -> Result<HashMap<String, PathBuf>, MetadataError> {
        let pool = threadpool::ThreadPool::new(num_extract_workers());
        let (tx, rx) = mpsc::channel();

        let mut per_repo_dir = HashMap::new();
        for repo_id in xml_by_repo.keys() {
            let dir = self.temp_root.join(uuid::Uuid::new_v4().to_string());
            per_repo_dir.insert(repo_id.clone(), dir);
        }

        let job_count = archive_paths.len();
        for ((repo_id, name, version), archive_path) in archive_paths {
            if handle.is_canceled() {
                pool.join();
                return Err(MetadataError::Canceled);
            }

            let dest = per_repo_dir[repo_id].join(name).join(version);
            let archive_path = archive_path.clone();
            let tx = tx.clone();
            let repo_id = repo_id.clone();

            pool.execute(move || {
                let result = unzip::extract(&archive_path, &dest);
                let _ = tx.send((repo_id, result));
            });
        }
        drop(tx);

        for _ in 0..job_count {
            let (repo_id, result) = rx.recv().map_err(|_| MetadataError::Canceled)?;
            result.map_err(|e| MetadataError::Extract {
                archive: per_repo_dir[&repo_id].clone(),
                message: e.to_string(),
            })?;
        }

        pool.join();
        Ok(per_repo_dir)
    }
}

fn decode_sha1(hex_str: &str) -> Option<[u8; 20]> {
    let bytes = hex::decode(hex_str).ok()?;
    bytes.try_into().ok()
}

fn num_extract_workers() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
}
