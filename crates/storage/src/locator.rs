use std::sync::{Arc, OnceLock};

use crate::runtime::{HostFault, RuntimeApi};

/// Maximum parent hops per chain, guarding against pathological frame
/// cycles.
pub const MAX_FRAME_HOPS: usize = 500;

/// One window in the frame ancestry the presenter is embedded in.
///
/// Every accessor may fault: touching a cross-origin window raises a
/// security violation in the host environment. The locator treats such a
/// fault as "nothing found on this branch" and keeps going, never
/// propagating it.
pub trait FrameHost: Send + Sync {
    /// The runtime API object injected into this window, if any.
    ///
    /// # Errors
    ///
    /// Returns `HostFault` when the window denies access.
    fn api(&self) -> Result<Option<Arc<dyn RuntimeApi>>, HostFault>;

    /// The parent window, or `None` at the top of the chain.
    ///
    /// # Errors
    ///
    /// Returns `HostFault` when the window denies access.
    fn parent(&self) -> Result<Option<Arc<dyn FrameHost>>, HostFault>;

    /// The window that opened this one, if any.
    ///
    /// # Errors
    ///
    /// Returns `HostFault` when the window denies access.
    fn opener(&self) -> Result<Option<Arc<dyn FrameHost>>, HostFault>;
}

/// Locates the host runtime API once and caches the outcome for the page
/// lifetime, so repeated calls are free.
///
/// Search order: the starting window and its parents (capped at
/// [`MAX_FRAME_HOPS`]), then the opener window's chain by the same rule.
pub struct ApiLocator {
    start: Arc<dyn FrameHost>,
    cache: OnceLock<Option<Arc<dyn RuntimeApi>>>,
}

impl ApiLocator {
    #[must_use]
    pub fn new(start: Arc<dyn FrameHost>) -> Self {
        Self {
            start,
            cache: OnceLock::new(),
        }
    }

    /// First runtime API found in the ancestry, or `None`. Both outcomes
    /// are cached.
    #[must_use]
    pub fn locate(&self) -> Option<Arc<dyn RuntimeApi>> {
        self.cache.get_or_init(|| self.search()).clone()
    }

    fn search(&self) -> Option<Arc<dyn RuntimeApi>> {
        if let Some(api) = climb(Arc::clone(&self.start)) {
            return Some(api);
        }
        match self.start.opener() {
            Ok(Some(opener)) => climb(opener),
            Ok(None) | Err(_) => None,
        }
    }
}

/// Walk one chain of parent windows looking for the API.
///
/// A fault anywhere along the chain ends that chain's search; the caller
/// may still try the opener branch.
fn climb(start: Arc<dyn FrameHost>) -> Option<Arc<dyn RuntimeApi>> {
    let mut window = start;
    for _ in 0..=MAX_FRAME_HOPS {
        match window.api() {
            Ok(Some(api)) => return Some(api),
            Ok(None) => {}
            Err(_) => return None,
        }
        match window.parent() {
            Ok(Some(parent)) => window = parent,
            Ok(None) | Err(_) => return None,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubApi;

    impl RuntimeApi for StubApi {
        fn initialize(&self, _arg: &str) -> Result<String, HostFault> {
            Ok("true".into())
        }
        fn get_value(&self, _element: &str) -> Result<String, HostFault> {
            Ok(String::new())
        }
        fn set_value(&self, _element: &str, _value: &str) -> Result<String, HostFault> {
            Ok("true".into())
        }
        fn commit(&self, _arg: &str) -> Result<String, HostFault> {
            Ok("true".into())
        }
        fn terminate(&self, _arg: &str) -> Result<String, HostFault> {
            Ok("true".into())
        }
    }

    /// A window whose accessors can be scripted per test.
    #[derive(Default)]
    struct FakeWindow {
        api: Option<Arc<dyn RuntimeApi>>,
        parent: Mutex<Option<Arc<dyn FrameHost>>>,
        opener: Option<Arc<dyn FrameHost>>,
        deny_api: bool,
        api_probes: Mutex<u32>,
    }

    impl FrameHost for FakeWindow {
        fn api(&self) -> Result<Option<Arc<dyn RuntimeApi>>, HostFault> {
            *self.api_probes.lock().unwrap() += 1;
            if self.deny_api {
                return Err(HostFault::new("cross-origin"));
            }
            Ok(self.api.clone())
        }

        fn parent(&self) -> Result<Option<Arc<dyn FrameHost>>, HostFault> {
            Ok(self.parent.lock().unwrap().clone())
        }

        fn opener(&self) -> Result<Option<Arc<dyn FrameHost>>, HostFault> {
            Ok(self.opener.clone())
        }
    }

    /// Build a chain with the API sitting `depth` hops above the leaf.
    /// Returns the leaf window.
    fn chain_with_api_at(depth: usize) -> Arc<FakeWindow> {
        let mut top = Arc::new(FakeWindow {
            api: Some(Arc::new(StubApi)),
            ..FakeWindow::default()
        });
        for _ in 0..depth {
            let child = Arc::new(FakeWindow::default());
            *child.parent.lock().unwrap() = Some(top.clone() as Arc<dyn FrameHost>);
            top = child;
        }
        top
    }

    #[test]
    fn finds_api_in_the_current_window() {
        let locator = ApiLocator::new(chain_with_api_at(0));
        assert!(locator.locate().is_some());
    }

    #[test]
    fn finds_api_up_to_the_hop_cap() {
        for depth in [1, 3, MAX_FRAME_HOPS] {
            let locator = ApiLocator::new(chain_with_api_at(depth));
            assert!(locator.locate().is_some(), "depth {depth}");
        }
    }

    #[test]
    fn gives_up_past_the_hop_cap() {
        let locator = ApiLocator::new(chain_with_api_at(MAX_FRAME_HOPS + 1));
        assert!(locator.locate().is_none());
    }

    #[test]
    fn survives_a_frame_cycle() {
        let a = Arc::new(FakeWindow::default());
        let b = Arc::new(FakeWindow::default());
        *a.parent.lock().unwrap() = Some(b.clone() as Arc<dyn FrameHost>);
        *b.parent.lock().unwrap() = Some(a.clone() as Arc<dyn FrameHost>);

        let locator = ApiLocator::new(a);
        assert!(locator.locate().is_none());
    }

    #[test]
    fn falls_back_to_the_opener_chain() {
        let opener_leaf = chain_with_api_at(2);
        let window = Arc::new(FakeWindow {
            opener: Some(opener_leaf as Arc<dyn FrameHost>),
            ..FakeWindow::default()
        });

        let locator = ApiLocator::new(window);
        assert!(locator.locate().is_some());
    }

    #[test]
    fn cross_origin_denial_ends_that_branch_only() {
        // Parent chain denies access; the opener chain still has the API.
        let denied = Arc::new(FakeWindow {
            deny_api: true,
            ..FakeWindow::default()
        });
        let leaf = Arc::new(FakeWindow {
            opener: Some(chain_with_api_at(1) as Arc<dyn FrameHost>),
            ..FakeWindow::default()
        });
        *leaf.parent.lock().unwrap() = Some(denied as Arc<dyn FrameHost>);

        let locator = ApiLocator::new(leaf);
        assert!(locator.locate().is_some());
    }

    #[test]
    fn caches_the_search_result() {
        let leaf = chain_with_api_at(0);
        let probes = || *leaf.api_probes.lock().unwrap();

        let locator = ApiLocator::new(leaf.clone());
        assert!(locator.locate().is_some());
        let after_first = probes();
        assert!(locator.locate().is_some());
        assert_eq!(probes(), after_first);
    }
}
