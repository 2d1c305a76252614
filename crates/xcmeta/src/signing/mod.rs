//! Signing configuration contract.
//!
//! Automatic code signing needs three facts about a project: which targets
//! it archives (with their entitlements), whether Xcode manages signing
//! automatically, and which platform it builds for. [`DetailsProvider`]
//! supplies them; each fact is fetched and can fail independently.
//!
//! Reading real project configuration is left to implementors. This module
//! defines the shapes they exchange, a programmable test double
//! ([`MockDetailsProvider`]) and [`collect_signing_details`], which gathers
//! all three facts for a signing run.

pub mod mock;

pub use mock::MockDetailsProvider;

use crate::plist_data::PlistData;
use crate::{Error, Result};
use plist::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Target platform of a signing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Ios,
    TvOs,
    MacOs,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "iOS",
            Platform::TvOs => "tvOS",
            Platform::MacOs => "macOS",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "tvos" => Ok(Platform::TvOs),
            "macos" | "osx" => Ok(Platform::MacOs),
            _ => Err(Error::Signing(format!("unknown platform: {}", s))),
        }
    }
}

/// Entitlements of one archivable target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entitlements(PlistData);

impl Entitlements {
    /// Parse an `.entitlements` plist.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        PlistData::from_bytes(data).map(Entitlements)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Entitlement keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.0.keys().collect();
        keys.sort_unstable();
        keys
    }

    pub fn is_empty(&self) -> bool {
        self.0.keys().next().is_none()
    }
}

impl From<plist::Dictionary> for Entitlements {
    fn from(dict: plist::Dictionary) -> Self {
        Entitlements(PlistData::from(dict))
    }
}

/// Targets of a project that need signing.
#[derive(Debug, Clone, PartialEq)]
pub struct AppLayout {
    pub platform: Platform,
    pub entitlements_by_bundle_id: BTreeMap<String, Entitlements>,
    pub ui_test_target_bundle_ids: Vec<String>,
}

impl AppLayout {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            entitlements_by_bundle_id: BTreeMap::new(),
            ui_test_target_bundle_ids: Vec::new(),
        }
    }

    /// Bundle IDs of archivable targets, sorted.
    pub fn bundle_ids(&self) -> impl Iterator<Item = &str> {
        self.entitlements_by_bundle_id.keys().map(String::as_str)
    }
}

/// Source of project signing configuration.
pub trait DetailsProvider {
    /// Targets to sign; UI test targets are included when `ui_test_targets` is set.
    fn get_app_layout(&self, ui_test_targets: bool) -> Result<AppLayout>;

    fn is_signing_managed_automatically(&self) -> Result<bool>;

    fn platform(&self) -> Result<Platform>;
}

/// All three signing facts of a project.
#[derive(Debug, Clone, PartialEq)]
pub struct SigningDetails {
    pub app_layout: AppLayout,
    pub managed_automatically: bool,
    pub platform: Platform,
}

/// Query every fact from `provider`.
///
/// The queries are independent; the first failure is returned with the
/// name of the fact that could not be determined.
pub fn collect_signing_details(
    provider: &dyn DetailsProvider,
    ui_test_targets: bool,
) -> Result<SigningDetails> {
    let managed_automatically = provider
        .is_signing_managed_automatically()
        .map_err(|e| {
            Error::Signing(format!(
                "failed to check if signing is managed automatically: {}",
                e
            ))
        })?;

    let platform = provider
        .platform()
        .map_err(|e| Error::Signing(format!("failed to read platform: {}", e)))?;

    let app_layout = provider
        .get_app_layout(ui_test_targets)
        .map_err(|e| Error::Signing(format!("failed to read app layout: {}", e)))?;

    if app_layout.platform != platform {
        log::warn!(
            "App layout platform ({}) differs from project platform ({})",
            app_layout.platform,
            platform
        );
    }

    Ok(SigningDetails {
        app_layout,
        managed_automatically,
        platform,
    })
}
