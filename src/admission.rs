//! Blank-line admission
//!
//! A marker is drawn over the line directly above a definition, and only
//! when that line is empty or whitespace, so no real content is hidden.

use crate::host::{BufferId, BufferSource};
use crate::locator::DefinitionSite;

/// Line to overlay for `site`, or `None` if placing a marker there would
/// hide content (or there is no line above)
pub fn admit<H>(host: &H, buffer: BufferId, site: &DefinitionSite) -> Option<usize>
where
    H: BufferSource + ?Sized,
{
    let above = site.anchor_line.checked_sub(1)?;
    let content = host.line(buffer, above)?;
    is_blank(&content).then_some(above)
}

/// Empty or whitespace-only
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::locator::DefinitionKind;

    fn site(line: usize) -> DefinitionSite {
        DefinitionSite {
            kind: DefinitionKind::Function,
            anchor_line: line,
        }
    }

    #[test]
    fn test_admits_blank_line_above() {
        let mut host = MemoryHost::new();
        let buf = host.open(&["", "def f():", "    pass"]);
        assert_eq!(admit(&host, buf, &site(1)), Some(0));
    }

    #[test]
    fn test_admits_whitespace_line_above() {
        let mut host = MemoryHost::new();
        let buf = host.open(&["x = 1", " \t ", "def f():"]);
        assert_eq!(admit(&host, buf, &site(2)), Some(1));
    }

    #[test]
    fn test_rejects_content_above() {
        let mut host = MemoryHost::new();
        let buf = host.open(&["x = 1", "def f():", "    pass"]);
        assert_eq!(admit(&host, buf, &site(1)), None);
    }

    #[test]
    fn test_rejects_first_line() {
        let mut host = MemoryHost::new();
        let buf = host.open(&["def f():", "    pass"]);
        assert_eq!(admit(&host, buf, &site(0)), None);
    }

    #[test]
    fn test_rejects_missing_line() {
        let mut host = MemoryHost::new();
        let buf = host.open(&["def f():"]);
        assert_eq!(admit(&host, buf, &site(5)), None);
        host.close(buf);
        assert_eq!(admit(&host, buf, &site(1)), None);
    }
}
