//! Script builders for element operations.
//!
//! The viewer renders inside a custom element, so plain `querySelectorAll`
//! from the document cannot see it. Every element operation runs a small
//! resolver that walks open shadow roots, applies each locator step inside
//! the previous step's matches, and hands the result to an operation body.
//!
//! Locators are embedded as JSON, never spliced into source text.

use crate::error::{BrowserError, Result};
use leafcheck_core::Locator;

const RESOLVER: &str = r"
const __lcQueryAll = (roots, selector) => {
  const found = [];
  const visit = (root) => {
    if (root.shadowRoot) visit(root.shadowRoot);
    for (const el of root.querySelectorAll(selector)) {
      if (!found.includes(el)) found.push(el);
    }
    for (const host of root.querySelectorAll('*')) {
      if (host.shadowRoot) visit(host.shadowRoot);
    }
  };
  roots.forEach(visit);
  return found;
};
const __lcResolve = (segments) => {
  let scope = [document];
  for (const segment of segments) {
    let found = __lcQueryAll(scope, segment.selector);
    if (segment.nth !== null) {
      const index = segment.nth === 'First' ? 0
        : segment.nth === 'Last' ? found.length - 1
        : segment.nth.Index;
      found = index >= 0 && index < found.length ? [found[index]] : [];
    }
    scope = found;
  }
  return scope;
};
";

/// Number of elements the locator matches.
pub const COUNT: &str = "return found.length;";

/// Whether the first match is rendered with a non-empty box and not hidden by style.
pub const VISIBLE: &str = r"
const el = found[0];
if (!el) return false;
const rect = el.getBoundingClientRect();
const style = window.getComputedStyle(el);
return rect.width > 0 && rect.height > 0
  && style.visibility !== 'hidden' && style.display !== 'none';
";

/// Clicks the first match; `false` when nothing matched.
pub const CLICK: &str = r"
const el = found[0];
if (!el) return false;
el.scrollIntoView({ block: 'center', inline: 'center' });
el.click();
return true;
";

/// The first match's client rect, or `null` when it is not rendered.
pub const BOUNDING_BOX: &str = r"
const el = found[0];
if (!el) return null;
const rect = el.getBoundingClientRect();
if (rect.width === 0 && rect.height === 0) return null;
return { x: rect.x, y: rect.y, width: rect.width, height: rect.height };
";

/// Document readiness and how many resource loads have finished.
pub const NETWORK_ACTIVITY: &str =
    "[document.readyState, performance.getEntriesByType('resource').length]";

/// Document readiness alone.
pub const READY_STATE: &str = "document.readyState";

/// Wraps `body` so it runs with `found` bound to the locator's matches.
///
/// # Errors
///
/// Returns `ScriptExecutionFailed` if the locator cannot be encoded.
pub fn with_matches(locator: &Locator, body: &str) -> Result<String> {
    let segments = serde_json::to_string(locator.segments())
        .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;
    Ok(format!(
        "(() => {{{RESOLVER}const found = __lcResolve({segments});{body}}})()"
    ))
}

/// Reads attribute `name` from the first match; `null` when absent.
///
/// # Errors
///
/// Returns `ScriptExecutionFailed` if the locator or name cannot be encoded.
pub fn attribute(locator: &Locator, name: &str) -> Result<String> {
    let name = serde_json::to_string(name)
        .map_err(|e| BrowserError::ScriptExecutionFailed(e.to_string()))?;
    with_matches(
        locator,
        &format!("const el = found[0]; return el ? el.getAttribute({name}) : null;"),
    )
}
