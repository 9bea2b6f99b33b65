//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use git2::{Oid, Repository, Signature};

use commitai::{
    ApiKey, DiffScope, GeneratorConfig, Notice, Notifier, Pipeline, PipelineOptions,
    ProviderKind, SystemGit, Workspace, build_generator,
};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new git repository with one commit, configured so the `git`
    /// binary can commit without prompting or signing.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config.set_str("user.name", "Test User").expect("Failed to set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set user.email");
            config.set_bool("commit.gpgsign", false).expect("Failed to set commit.gpgsign");
        }
        let test_repo = Self { dir, repo };
        test_repo.write("README.md", "# test\n");
        test_repo.stage("README.md");
        test_repo.commit_index("Initial commit");
        test_repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` inside the working tree.
    pub fn write(&self, name: &str, content: &str) {
        let file_path = self.path().join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(file_path, content).expect("Failed to write test file");
    }

    /// Add `name` to the index.
    pub fn stage(&self, name: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Commit the current index with git2. Returns the commit OID.
    pub fn commit_index(&self, message: &str) -> Oid {
        let sig = Signature::now("Test User", "test@example.com")
            .expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        // Get parent commit if exists
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Message of the commit HEAD points to.
    pub fn head_message(&self) -> String {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to read HEAD commit");
        head.message().unwrap_or_default().to_string()
    }

    pub fn head_oid(&self) -> Oid {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to read HEAD commit")
            .id()
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::resolve(Some(self.path())).expect("Failed to resolve workspace")
    }
}

/// Generator settings pointing at a mock server.
pub fn generator_config(provider: ProviderKind, endpoint: &str) -> GeneratorConfig {
    let mut config = GeneratorConfig::for_provider(provider);
    config.endpoint = endpoint.to_string();
    config.api_key = ApiKey::new("test-key");
    config.timeout = Duration::from_secs(5);
    config
}

/// A pipeline on `repo` with the real git binary and an HTTP generator.
pub fn pipeline(repo: &TestRepo, config: &GeneratorConfig, options: PipelineOptions) -> Pipeline {
    let git = SystemGit::locate().expect("git should be installed for tests");
    let generator = build_generator(config).expect("Failed to build generator");
    Pipeline::new(Box::new(git), generator, repo.workspace(), options)
}

pub fn staged() -> PipelineOptions {
    PipelineOptions {
        scope: DiffScope::Staged,
        dry_run: false,
    }
}

/// Notifier that keeps every notice it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}
