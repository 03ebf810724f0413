//! Combined resolve-and-generate entry point
//!
//! Resolution is the only layer allowed to drop a plugin: an unreachable or
//! malformed source is logged and skipped so one bad upstream cannot abort
//! the whole run. Fetches run in parallel internally; callers never observe
//! the ordering because generation sorts.

use rayon::prelude::*;
use tracing::warn;

use plugnix_manifest::{ManifestError, PluginDescriptor, ResolvedPlugin};

use crate::errors::ResolveError;
use crate::github::RevisionSource;

/// Resolve every descriptor, then hand the surviving pairs to the
/// generation callback. Returns the pairs for post-generation inspection.
pub fn update_and_generate<S, G>(
    source: &S,
    descriptors: &[PluginDescriptor],
    generate: G,
) -> Result<Vec<(PluginDescriptor, ResolvedPlugin)>, ResolveError>
where
    S: RevisionSource + Sync,
    G: FnOnce(&[(PluginDescriptor, ResolvedPlugin)]) -> Result<(), ManifestError>,
{
    let pairs: Vec<(PluginDescriptor, ResolvedPlugin)> = descriptors
        .par_iter()
        .filter_map(|desc| match source.resolve(desc) {
            Ok(plugin) => Some((desc.clone(), plugin)),
            Err(e) => {
                warn!("skipping {}: {}", desc.name(), e);
                None
            }
        })
        .collect();

    generate(&pairs)?;
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        fail_name: &'static str,
        calls: AtomicUsize,
    }

    impl RevisionSource for FakeSource {
        fn resolve(&self, desc: &PluginDescriptor) -> Result<ResolvedPlugin, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if desc.name() == self.fail_name {
                return Err(ResolveError::NoRevision {
                    url: desc.uri(),
                    reference: "HEAD".to_string(),
                });
            }
            Ok(ResolvedPlugin {
                name: desc.name().to_string(),
                version: "2024-01-01".to_string(),
                commit: "abc123".to_string(),
                sha256: "sha256-fake".to_string(),
            })
        }
    }

    fn descriptors() -> Vec<PluginDescriptor> {
        vec![
            PluginDescriptor::new("https://github.com/a/one/", None, None),
            PluginDescriptor::new("https://github.com/b/two/", None, None),
            PluginDescriptor::new("https://github.com/c/three/", None, None),
        ]
    }

    #[test]
    fn test_failure_is_isolated_per_plugin() {
        let source = FakeSource {
            fail_name: "two",
            calls: AtomicUsize::new(0),
        };

        let result = update_and_generate(&source, &descriptors(), |pairs| {
            assert_eq!(pairs.len(), 2);
            assert!(pairs.iter().all(|(d, _)| d.name() != "two"));
            Ok(())
        });

        assert!(result.is_ok_and(|pairs| pairs.len() == 2));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_all_plugins_resolve() {
        let source = FakeSource {
            fail_name: "",
            calls: AtomicUsize::new(0),
        };

        let result = update_and_generate(&source, &descriptors(), |_| Ok(()));
        assert!(result.is_ok_and(|pairs| pairs.len() == 3));
    }

    #[test]
    fn test_generation_error_is_fatal() {
        let source = FakeSource {
            fail_name: "",
            calls: AtomicUsize::new(0),
        };

        let result = update_and_generate(&source, &descriptors(), |_| {
            Err(ManifestError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_descriptor_list_still_generates() {
        let source = FakeSource {
            fail_name: "",
            calls: AtomicUsize::new(0),
        };
        let generated = AtomicUsize::new(0);

        let result = update_and_generate(&source, &[], |pairs| {
            generated.fetch_add(1, Ordering::SeqCst);
            assert!(pairs.is_empty());
            Ok(())
        });

        assert!(result.is_ok());
        assert_eq!(generated.load(Ordering::SeqCst), 1);
    }
}
