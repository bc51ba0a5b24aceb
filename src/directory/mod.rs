use anyhow::{Context, Result};
use dashmap::DashMap;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;


/// Organization account as seen by the login path
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Organization {
    pub org_id: String,
    pub org_name: String,
    /// Public business identifier used to log in
    pub business_number: String,
    /// Encoded credential column
    pub password_hash: String,
}

impl std::fmt::Debug for Organization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Organization")
            .field("org_id", &self.org_id)
            .field("org_name", &self.org_name)
            .field("business_number", &self.business_number)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Read access to organization accounts.
///
/// Implemented by the persistence layer; the in-memory directory below
/// backs the binary and tests.
pub trait OrganizationDirectory: Send + Sync {
    fn find_by_business_number(&self, business_number: &str) -> Option<Organization>;

    fn find_by_id(&self, org_id: &str) -> Option<Organization>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("business number '{0}' already registered")]
    DuplicateBusinessNumber(String),

    #[error("organization id '{0}' already registered")]
    DuplicateOrgId(String),
}

/// In-memory organization directory
pub struct InMemoryDirectory {
    /// Primary storage: org_id -> Organization
    organizations: Arc<DashMap<String, Organization>>,
    /// Secondary index: business_number -> org_id (for login)
    business_numbers: Arc<DashMap<String, String>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self {
            organizations: Arc::new(DashMap::new()),
            business_numbers: Arc::new(DashMap::new()),
        }
    }

    /// Add an organization. Business numbers and org ids must be unique.
    pub fn insert(&self, organization: Organization) -> Result<(), DirectoryError> {
        if self.organizations.contains_key(&organization.org_id) {
            return Err(DirectoryError::DuplicateOrgId(organization.org_id));
        }
        if self.business_numbers.contains_key(&organization.business_number) {
            return Err(DirectoryError::DuplicateBusinessNumber(
                organization.business_number,
            ));
        }

        self.business_numbers.insert(
            organization.business_number.clone(),
            organization.org_id.clone(),
        );
        self.organizations
            .insert(organization.org_id.clone(), organization);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.organizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.organizations.is_empty()
    }

    /// Load organizations from a TOML seed file.
    ///
    /// ```toml
    /// [[organizations]]
    /// org_id = "ORG1"
    /// org_name = "Example Org"
    /// business_number = "123-45-67890"
    /// password_hash = "..."
    /// ```
    pub fn load_seed_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read organizations file {}", path.display()))?;
        let directory = Self::from_seed_toml(&contents)
            .with_context(|| format!("Failed to load organizations file {}", path.display()))?;

        info!(
            path = %path.display(),
            count = directory.len(),
            "Organizations loaded"
        );
        Ok(directory)
    }

    /// Build a directory from seed TOML text.
    pub fn from_seed_toml(contents: &str) -> Result<Self> {
        let seed: SeedFile = toml::from_str(contents).context("Invalid organizations TOML")?;

        let directory = Self::new();
        for organization in seed.organizations {
            directory.insert(organization)?;
        }
        Ok(directory)
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl OrganizationDirectory for InMemoryDirectory {
    fn find_by_business_number(&self, business_number: &str) -> Option<Organization> {
        let org_id = self.business_numbers.get(business_number)?;
        self.organizations.get(org_id.value()).map(|o| o.clone())
    }

    fn find_by_id(&self, org_id: &str) -> Option<Organization> {
        self.organizations.get(org_id).map(|o| o.clone())
    }
}

#[derive(Deserialize)]
struct SeedFile {
    #[serde(default)]
    organizations: Vec<Organization>,
}
