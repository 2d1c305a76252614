//! Programmable [`DetailsProvider`] for tests.
//!
//! Each operation is answered by a closure (or a fixed value) set up front.
//! Calls are recorded so tests can assert on how a signing orchestrator used
//! the provider.

use super::{AppLayout, DetailsProvider, Platform};
use crate::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

type AppLayoutFn = Box<dyn Fn(bool) -> Result<AppLayout> + Send + Sync>;
type ManagedFn = Box<dyn Fn() -> Result<bool> + Send + Sync>;
type PlatformFn = Box<dyn Fn() -> Result<Platform> + Send + Sync>;

/// Test double for [`DetailsProvider`].
///
/// Operations without a programmed answer return [`Error::Signing`].
///
/// # Examples
///
/// ```
/// use xcmeta::signing::{DetailsProvider, MockDetailsProvider, Platform};
///
/// let provider = MockDetailsProvider::new()
///     .with_platform(Platform::Ios)
///     .on_managed_automatically(|| Err(xcmeta::Error::Signing("no project".into())));
///
/// assert_eq!(provider.platform().unwrap(), Platform::Ios);
/// assert!(provider.is_signing_managed_automatically().is_err());
/// assert_eq!(provider.platform_calls(), 1);
/// ```
#[derive(Default)]
pub struct MockDetailsProvider {
    app_layout: Option<AppLayoutFn>,
    managed_automatically: Option<ManagedFn>,
    platform: Option<PlatformFn>,
    app_layout_calls: Mutex<Vec<bool>>,
    managed_automatically_calls: AtomicUsize,
    platform_calls: AtomicUsize,
}

impl MockDetailsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_app_layout(
        mut self,
        f: impl Fn(bool) -> Result<AppLayout> + Send + Sync + 'static,
    ) -> Self {
        self.app_layout = Some(Box::new(f));
        self
    }

    pub fn on_managed_automatically(
        mut self,
        f: impl Fn() -> Result<bool> + Send + Sync + 'static,
    ) -> Self {
        self.managed_automatically = Some(Box::new(f));
        self
    }

    pub fn on_platform(mut self, f: impl Fn() -> Result<Platform> + Send + Sync + 'static) -> Self {
        self.platform = Some(Box::new(f));
        self
    }

    /// Always answer `get_app_layout` with `layout`.
    pub fn with_app_layout(self, layout: AppLayout) -> Self {
        self.on_app_layout(move |_| Ok(layout.clone()))
    }

    pub fn with_managed_automatically(self, managed: bool) -> Self {
        self.on_managed_automatically(move || Ok(managed))
    }

    pub fn with_platform(self, platform: Platform) -> Self {
        self.on_platform(move || Ok(platform))
    }

    /// Arguments of every `get_app_layout` call, in order.
    pub fn app_layout_calls(&self) -> Vec<bool> {
        self.app_layout_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn managed_automatically_calls(&self) -> usize {
        self.managed_automatically_calls.load(Ordering::SeqCst)
    }

    pub fn platform_calls(&self) -> usize {
        self.platform_calls.load(Ordering::SeqCst)
    }
}

fn not_programmed(operation: &str) -> Error {
    Error::Signing(format!("MockDetailsProvider: no return value set for {}", operation))
}

impl DetailsProvider for MockDetailsProvider {
    fn get_app_layout(&self, ui_test_targets: bool) -> Result<AppLayout> {
        self.app_layout_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ui_test_targets);
        match self.app_layout {
            Some(ref f) => f(ui_test_targets),
            None => Err(not_programmed("GetAppLayout")),
        }
    }

    fn is_signing_managed_automatically(&self) -> Result<bool> {
        self.managed_automatically_calls.fetch_add(1, Ordering::SeqCst);
        match self.managed_automatically {
            Some(ref f) => f(),
            None => Err(not_programmed("IsSigningManagedAutomatically")),
        }
    }

    fn platform(&self) -> Result<Platform> {
        self.platform_calls.fetch_add(1, Ordering::SeqCst);
        match self.platform {
            Some(ref f) => f(),
            None => Err(not_programmed("Platform")),
        }
    }
}
