//! Marker overlay management
//!
//! Places and clears marker overlays in a dedicated namespace. The host's
//! overlay store is the source of truth for what is showing; this type
//! keeps no per-buffer state of its own.

use std::collections::{BTreeMap, BTreeSet};

use crate::admission::admit;
use crate::error::DefmarkError;
use crate::host::{BufferId, Host, NamespaceId, NotifyLevel, OverlayId, OverlayStore};
use crate::locator::DefinitionSite;
use crate::marker::MarkerSpec;

/// Namespace used when none is given
pub const DEFAULT_NAMESPACE: NamespaceId = NamespaceId(0x6465_66);

/// Outcome of a full refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Definition sites handed in
    pub sites: usize,
    /// Sites that passed the blank-line check
    pub admitted: usize,
    /// Markers the host accepted
    pub placed: usize,
    /// Markers the host rejected
    pub failed: usize,
}

impl RefreshReport {
    pub fn is_partial(&self) -> bool {
        self.failed > 0
    }
}

/// Places line-keyed markers in one overlay namespace
#[derive(Debug, Clone, Copy)]
pub struct OverlayManager {
    namespace: NamespaceId,
}

impl Default for OverlayManager {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl OverlayManager {
    pub fn new(namespace: NamespaceId) -> Self {
        Self { namespace }
    }

    pub fn namespace(&self) -> NamespaceId {
        self.namespace
    }

    /// Remove every marker in the buffer. Returns how many were showing.
    pub fn clear<H>(&self, host: &mut H, buffer: BufferId) -> usize
    where
        H: OverlayStore + ?Sized,
    {
        let existing = host.list_overlays(buffer, self.namespace).len();
        host.clear_namespace(buffer, self.namespace);
        existing
    }

    /// Create or replace the marker at `line`
    pub fn place<H>(
        &self,
        host: &mut H,
        buffer: BufferId,
        line: usize,
        marker: MarkerSpec,
    ) -> Result<OverlayId, DefmarkError>
    where
        H: OverlayStore + ?Sized,
    {
        for entry in host.list_overlays(buffer, self.namespace) {
            if entry.line == line {
                host.remove_overlay(buffer, self.namespace, entry.id);
            }
        }
        host.set_overlay(buffer, self.namespace, line, &marker.text(), marker.style)
    }

    /// Lines currently carrying a marker
    pub fn list_active<H>(&self, host: &H, buffer: BufferId) -> BTreeSet<usize>
    where
        H: OverlayStore + ?Sized,
    {
        host.list_overlays(buffer, self.namespace)
            .into_iter()
            .map(|entry| entry.line)
            .collect()
    }

    /// Marker text by line
    pub fn active_markers<H>(&self, host: &H, buffer: BufferId) -> BTreeMap<usize, String>
    where
        H: OverlayStore + ?Sized,
    {
        host.list_overlays(buffer, self.namespace)
            .into_iter()
            .map(|entry| (entry.line, entry.text))
            .collect()
    }

    /// Clear the buffer, then place a marker for every admitted site
    ///
    /// A rejected placement does not stop the others; the count of failures
    /// is reported and surfaced as a warning.
    pub fn refresh_all<H>(
        &self,
        host: &mut H,
        buffer: BufferId,
        sites: &[DefinitionSite],
    ) -> RefreshReport
    where
        H: Host + ?Sized,
    {
        self.clear(host, buffer);

        let mut report = RefreshReport {
            sites: sites.len(),
            ..Default::default()
        };

        for site in sites {
            let Some(line) = admit(&*host, buffer, site) else {
                continue;
            };
            report.admitted += 1;

            match self.place(host, buffer, line, MarkerSpec::for_kind(site.kind)) {
                Ok(_) => report.placed += 1,
                Err(e) => {
                    tracing::debug!("Marker for {} at line {}: {}", site.kind.label(), line, e);
                    report.failed += 1;
                }
            }
        }

        if report.is_partial() {
            let message = format!(
                "Placed {} markers, {} failed in buffer {}",
                report.placed, report.failed, buffer
            );
            tracing::warn!("{}", message);
            host.notify(NotifyLevel::Warn, &message);
        } else {
            tracing::debug!(
                "Refreshed buffer {}: {} sites, {} markers",
                buffer,
                report.sites,
                report.placed
            );
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{BufferSource, MemoryHost, Notifier, OverlayEntry};
    use crate::locator::DefinitionKind;
    use crate::marker::{CLASS_MARKER, FUNCTION_MARKER};
    use std::path::PathBuf;

    fn function_at(line: usize) -> DefinitionSite {
        DefinitionSite {
            kind: DefinitionKind::Function,
            anchor_line: line,
        }
    }

    #[test]
    fn test_place_replaces_existing_line() {
        let mut host = MemoryHost::new();
        let buf = host.open(&["", "class A:"]);
        let manager = OverlayManager::default();

        manager.place(&mut host, buf, 0, FUNCTION_MARKER).unwrap();
        manager.place(&mut host, buf, 0, CLASS_MARKER).unwrap();

        let markers = manager.active_markers(&host, buf);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[&0], "#".repeat(100));
        assert_eq!(host.list_overlays(buf, manager.namespace()).len(), 1);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut host = MemoryHost::new();
        let buf = host.open(&["", "def f():"]);
        let manager = OverlayManager::default();
        manager.place(&mut host, buf, 0, FUNCTION_MARKER).unwrap();

        assert_eq!(manager.clear(&mut host, buf), 1);
        assert_eq!(manager.clear(&mut host, buf), 0);
        assert!(manager.list_active(&host, buf).is_empty());
    }

    #[test]
    fn test_refresh_all_places_admitted_sites() {
        let mut host = MemoryHost::new();
        let buf = host.open(&["", "def f():", "    pass", "def g():", "    pass"]);
        let manager = OverlayManager::default();

        let report = manager.refresh_all(&mut host, buf, &[function_at(1), function_at(3)]);

        assert_eq!(
            report,
            RefreshReport {
                sites: 2,
                admitted: 1,
                placed: 1,
                failed: 0
            }
        );
        assert_eq!(manager.list_active(&host, buf), BTreeSet::from([0]));
    }

    #[test]
    fn test_refresh_all_replaces_previous_markers() {
        let mut host = MemoryHost::new();
        let buf = host.open(&["", "", "def f():"]);
        let manager = OverlayManager::default();
        manager.place(&mut host, buf, 0, CLASS_MARKER).unwrap();

        manager.refresh_all(&mut host, buf, &[function_at(2)]);

        assert_eq!(manager.list_active(&host, buf), BTreeSet::from([1]));
    }

    #[test]
    fn test_refresh_all_is_idempotent() {
        let mut host = MemoryHost::new();
        let buf = host.open(&["", "def f():", "", "class A:"]);
        let manager = OverlayManager::default();
        let sites = [
            function_at(1),
            DefinitionSite {
                kind: DefinitionKind::Class,
                anchor_line: 3,
            },
        ];

        manager.refresh_all(&mut host, buf, &sites);
        let first = manager.active_markers(&host, buf);
        manager.refresh_all(&mut host, buf, &sites);
        let second = manager.active_markers(&host, buf);

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    /// Host whose overlay primitive rejects one specific line
    struct RejectingHost {
        inner: MemoryHost,
        reject: usize,
    }

    impl BufferSource for RejectingHost {
        fn is_valid(&self, buffer: BufferId) -> bool {
            self.inner.is_valid(buffer)
        }
        fn line(&self, buffer: BufferId, line: usize) -> Option<String> {
            self.inner.line(buffer, line)
        }
        fn text(&self, buffer: BufferId) -> Option<String> {
            self.inner.text(buffer)
        }
        fn file_type(&self, buffer: BufferId) -> Option<String> {
            self.inner.file_type(buffer)
        }
        fn path(&self, buffer: BufferId) -> Option<PathBuf> {
            self.inner.path(buffer)
        }
    }

    impl OverlayStore for RejectingHost {
        fn set_overlay(
            &mut self,
            buffer: BufferId,
            namespace: NamespaceId,
            line: usize,
            text: &str,
            style: &str,
        ) -> Result<OverlayId, DefmarkError> {
            if line == self.reject {
                return Err(DefmarkError::OverlayPlacementFailed {
                    line,
                    reason: "rejected".to_string(),
                });
            }
            self.inner.set_overlay(buffer, namespace, line, text, style)
        }
        fn remove_overlay(&mut self, buffer: BufferId, namespace: NamespaceId, id: OverlayId) -> bool {
            self.inner.remove_overlay(buffer, namespace, id)
        }
        fn clear_namespace(&mut self, buffer: BufferId, namespace: NamespaceId) {
            self.inner.clear_namespace(buffer, namespace)
        }
        fn list_overlays(&self, buffer: BufferId, namespace: NamespaceId) -> Vec<OverlayEntry> {
            self.inner.list_overlays(buffer, namespace)
        }
    }

    impl Notifier for RejectingHost {
        fn notify(&mut self, level: NotifyLevel, message: &str) {
            self.inner.notify(level, message)
        }
    }

    #[test]
    fn test_partial_failure_is_reported() {
        let mut inner = MemoryHost::new();
        let buf = inner.open(&["", "def f():", "", "def g():", "", "def h():"]);
        let mut host = RejectingHost { inner, reject: 2 };
        let manager = OverlayManager::default();

        let report =
            manager.refresh_all(&mut host, buf, &[function_at(1), function_at(3), function_at(5)]);

        assert_eq!(report.placed, 2);
        assert_eq!(report.failed, 1);
        assert!(report.is_partial());
        assert_eq!(manager.list_active(&host, buf), BTreeSet::from([0, 4]));
        assert_eq!(host.inner.notifications.len(), 1);
        assert_eq!(host.inner.notifications[0].0, NotifyLevel::Warn);
        assert!(host.inner.notifications[0].1.contains("2 markers, 1 failed"));
    }
}
