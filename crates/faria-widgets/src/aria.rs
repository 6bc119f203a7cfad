#![forbid(unsafe_code)]

//! ARIA attribute sets.
//!
//! Primitives never render markup. They describe the accessibility
//! attributes a host element should carry as an ordered list of
//! `(name, value)` pairs, which the presentation layer copies onto the
//! element it renders.

use std::fmt;

use faria_core::element::ElementId;

/// Live-region politeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Politeness {
    /// Announce when the user is idle.
    #[default]
    Polite,
    /// Interrupt the user.
    Assertive,
}

impl Politeness {
    /// The `aria-live` value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }
}

/// Stable DOM id for an element, derived from its handle and a role suffix.
///
/// `dom_id(el, "tab")` yields `"faria-tab-17"`; the same inputs always give
/// the same id, so `aria-controls`/`aria-labelledby` can be wired without a
/// separate id registry.
#[must_use]
pub fn dom_id(element: ElementId, suffix: &str) -> String {
    format!("faria-{suffix}-{}", element.raw())
}

/// Ordered set of accessibility attributes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AriaAttrs {
    attrs: Vec<(&'static str, String)>,
}

impl AriaAttrs {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing an earlier value but keeping its position.
    #[must_use]
    pub fn set(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    fn flag(self, name: &'static str, on: bool) -> Self {
        self.set(name, if on { "true" } else { "false" })
    }

    /// `role`.
    #[must_use]
    pub fn role(self, role: &str) -> Self {
        self.set("role", role)
    }

    /// `id`.
    #[must_use]
    pub fn id(self, id: impl Into<String>) -> Self {
        self.set("id", id)
    }

    /// `tabindex`.
    #[must_use]
    pub fn tab_index(self, index: i32) -> Self {
        self.set("tabindex", index.to_string())
    }

    /// `aria-selected`.
    #[must_use]
    pub fn selected(self, selected: bool) -> Self {
        self.flag("aria-selected", selected)
    }

    /// `aria-expanded`.
    #[must_use]
    pub fn expanded(self, expanded: bool) -> Self {
        self.flag("aria-expanded", expanded)
    }

    /// `aria-haspopup`.
    #[must_use]
    pub fn has_popup(self, kind: &str) -> Self {
        self.set("aria-haspopup", kind)
    }

    /// `aria-controls`.
    #[must_use]
    pub fn controls(self, id: impl Into<String>) -> Self {
        self.set("aria-controls", id)
    }

    /// `aria-labelledby`.
    #[must_use]
    pub fn labelled_by(self, id: impl Into<String>) -> Self {
        self.set("aria-labelledby", id)
    }

    /// `aria-describedby`.
    #[must_use]
    pub fn described_by(self, id: impl Into<String>) -> Self {
        self.set("aria-describedby", id)
    }

    /// `aria-modal`.
    #[must_use]
    pub fn modal(self, modal: bool) -> Self {
        self.flag("aria-modal", modal)
    }

    /// `aria-invalid`.
    #[must_use]
    pub fn invalid(self, invalid: bool) -> Self {
        self.flag("aria-invalid", invalid)
    }

    /// `aria-disabled`. Only emitted when `true`.
    #[must_use]
    pub fn disabled(self, disabled: bool) -> Self {
        if disabled {
            self.flag("aria-disabled", true)
        } else {
            self
        }
    }

    /// `aria-live`.
    #[must_use]
    pub fn live(self, politeness: Politeness) -> Self {
        self.set("aria-live", politeness.as_str())
    }

    /// `aria-atomic`.
    #[must_use]
    pub fn atomic(self, atomic: bool) -> Self {
        self.flag("aria-atomic", atomic)
    }

    /// `aria-orientation`.
    #[must_use]
    pub fn orientation(self, orientation: &str) -> Self {
        self.set("aria-orientation", orientation)
    }

    /// Look up one attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.attrs.iter().map(|(n, v)| (*n, v.as_str()))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

impl fmt::Display for AriaAttrs {
    /// Renders as HTML attribute syntax, e.g. `role="tab" aria-selected="true"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.attrs.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}=\"{}\"", value.replace('"', "&quot;"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_replaces_in_place() {
        let attrs = AriaAttrs::new()
            .role("tab")
            .selected(false)
            .tab_index(-1)
            .selected(true);
        let names: Vec<_> = attrs.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["role", "aria-selected", "tabindex"]);
        assert_eq!(attrs.get("aria-selected"), Some("true"));
        assert_eq!(attrs.get("tabindex"), Some("-1"));
    }

    #[test]
    fn disabled_is_omitted_when_false() {
        assert!(!AriaAttrs::new().disabled(false).contains("aria-disabled"));
        assert_eq!(
            AriaAttrs::new().disabled(true).get("aria-disabled"),
            Some("true")
        );
    }

    #[test]
    fn display_renders_html_attributes() {
        let attrs = AriaAttrs::new().role("dialog").modal(true).labelled_by("t\"1");
        assert_eq!(
            attrs.to_string(),
            r#"role="dialog" aria-modal="true" aria-labelledby="t&quot;1""#
        );
    }

    #[test]
    fn dom_id_is_stable() {
        let el = ElementId::from_raw(17);
        assert_eq!(dom_id(el, "tab"), "faria-tab-17");
        assert_eq!(dom_id(el, "tab"), dom_id(el, "tab"));
        assert_ne!(dom_id(el, "tab"), dom_id(el, "panel"));
    }

    #[test]
    fn politeness_strings() {
        assert_eq!(Politeness::Polite.as_str(), "polite");
        assert_eq!(Politeness::Assertive.as_str(), "assertive");
        let attrs = AriaAttrs::new().live(Politeness::Assertive);
        assert_eq!(attrs.get("aria-live"), Some("assertive"));
    }
}
