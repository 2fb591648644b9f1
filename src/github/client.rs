//! Octocrab client wrapper scoped to a specific repository.

use octocrab::Octocrab;

use crate::types::RepoId;

/// A GitHub API client scoped to a specific repository.
///
/// Effects don't carry repository information, so every call made through
/// this client targets `repo`.
#[derive(Clone)]
pub struct OctocrabClient {
    client: Octocrab,
    repo: RepoId,
}

impl OctocrabClient {
    pub fn new(client: Octocrab, repo: RepoId) -> Self {
        Self { client, repo }
    }

    /// Creates a client authenticated with a token, optionally against a
    /// non-default API base (GitHub Enterprise Server).
    pub fn from_token(
        token: impl Into<String>,
        api_base: Option<&str>,
        repo: RepoId,
    ) -> Result<Self, octocrab::Error> {
        let mut builder = Octocrab::builder().personal_token(token.into());
        if let Some(base) = api_base {
            builder = builder.base_uri(base)?;
        }
        Ok(Self::new(builder.build()?, repo))
    }

    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    pub fn repo_name(&self) -> &str {
        &self.repo.repo
    }

    /// Builds a repository-relative REST route, e.g. `actions/runs/1`.
    pub fn route(&self, path: &str) -> String {
        format!("/repos/{}/{}/{}", self.owner(), self.repo_name(), path)
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}
