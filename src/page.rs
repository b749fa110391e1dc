use std::collections::HashMap;

use crate::conventions::Conventions;
use crate::dom::{Dom, NodeId, truncate_chars};
use crate::error::{Error, Result};
use crate::events::{EventState, Handler, Listener, ListenerStore};
use crate::html::parse_html;
use crate::regex::Regex;
use crate::scheduler::Scheduler;
use crate::trace::TraceState;

const DEFAULT_DOCUMENT_URL: &str = "http://localhost/";
const ACTION_STACK_SIZE: usize = 32 * 1024 * 1024;

/// A loaded admin page: document, listeners, virtual clock and captured output.
///
/// Behaviors are attached with [`crate::install_page_controls`] and
/// [`crate::install_sidebar`]; user actions on the page then drive them.
#[derive(Debug)]
pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) scheduler: Scheduler,
    pub(crate) conventions: Conventions,
    pub(crate) document_url: String,
    pub(crate) error_markers: HashMap<NodeId, NodeId>,
    pub(crate) submissions: Vec<NodeId>,
    pub(crate) console: Vec<String>,
    pub(crate) trace: TraceState,
    pub(crate) non_digit: Regex,
    pub(crate) unloaded: bool,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_url(DEFAULT_DOCUMENT_URL, html)
    }

    pub fn from_html_with_url(url: &str, html: &str) -> Result<Self> {
        let dom = parse_html(html)?;
        Ok(Self {
            dom,
            listeners: ListenerStore::default(),
            scheduler: Scheduler::default(),
            conventions: Conventions::default(),
            document_url: url.to_string(),
            error_markers: HashMap::new(),
            submissions: Vec::new(),
            console: Vec::new(),
            trace: TraceState::default(),
            non_digit: Regex::new("[^0-9]")?,
            unloaded: false,
        })
    }

    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    /// Replaces the markup conventions. Takes effect for behaviors installed afterwards.
    pub fn set_conventions(&mut self, conventions: Conventions) -> Result<()> {
        conventions.validate()?;
        self.conventions = conventions;
        Ok(())
    }

    // ---- user actions -------------------------------------------------------

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.ensure_loaded()?;
        stacker::grow(ACTION_STACK_SIZE, || {
            let outcome = self.dispatch_event(target, "click")?;
            if outcome.default_prevented {
                return Ok(());
            }
            if self.is_submit_control(target) {
                if let Some(form) = self.dom.find_ancestor_by_tag(target, "form") {
                    self.submit_form(form)?;
                }
            }
            Ok(())
        })
    }

    /// Submits the form matched by `selector`, or the form owning the matched control.
    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.ensure_loaded()?;
        let form = if self.is_tag(target, "form") {
            Some(target)
        } else {
            self.dom.find_ancestor_by_tag(target, "form")
        };
        let Some(form) = form else {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "form or form control".into(),
                actual: self.trace_node_label(target),
            });
        };
        stacker::grow(ACTION_STACK_SIZE, || self.submit_form(form))
    }

    /// Replaces the control's value with `text` and fires one `input` event.
    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_text_control(selector)?;
        self.ensure_loaded()?;
        stacker::grow(ACTION_STACK_SIZE, || {
            self.dom.set_value(target, text)?;
            self.dispatch_event(target, "input")?;
            Ok(())
        })
    }

    /// Appends `keys` one character at a time, firing `input` after each.
    pub fn type_keys(&mut self, selector: &str, keys: &str) -> Result<()> {
        let target = self.select_text_control(selector)?;
        self.ensure_loaded()?;
        stacker::grow(ACTION_STACK_SIZE, || {
            for key in keys.chars() {
                let mut value = self.dom.value(target)?;
                value.push(key);
                self.dom.set_value(target, &value)?;
                self.dispatch_event(target, "input")?;
            }
            Ok(())
        })
    }

    /// Sets the value and commits it the way leaving the field does: `input`, then `change`.
    pub fn commit_value(&mut self, selector: &str, value: &str) -> Result<()> {
        let target = self.select_text_control(selector)?;
        self.ensure_loaded()?;
        stacker::grow(ACTION_STACK_SIZE, || {
            self.dom.set_value(target, value)?;
            self.dispatch_event(target, "input")?;
            self.dispatch_event(target, "change")?;
            Ok(())
        })
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<EventState> {
        let target = self.select_one(selector)?;
        self.ensure_loaded()?;
        stacker::grow(ACTION_STACK_SIZE, || self.dispatch_event(target, event))
    }

    /// Removes the first match from the document, cancelling timers aimed at it.
    pub fn remove(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.remove_node(target)
    }

    /// Registers a listener on every match. Returns how many were newly added.
    pub fn add_listener(&mut self, selector: &str, event: &str, handler: Handler) -> Result<usize> {
        let targets = self.dom.query_selector_all(selector)?;
        let mut added = 0;
        for target in targets {
            let listener = Listener {
                capture: false,
                handler: handler.clone(),
            };
            if self.listeners.add(target, event, listener) {
                added += 1;
            }
        }
        Ok(added)
    }

    pub fn remove_listener(&mut self, selector: &str, event: &str, handler: Handler) -> Result<usize> {
        let targets = self.dom.query_selector_all(selector)?;
        let listener = Listener {
            capture: false,
            handler,
        };
        Ok(targets
            .into_iter()
            .filter(|target| self.listeners.remove(*target, event, &listener))
            .count())
    }

    pub fn listener_count(&self, selector: &str, event: &str) -> Result<usize> {
        let target = self.select_one(selector)?;
        Ok(self.listeners.count(target, event))
    }

    pub fn total_listeners(&self) -> usize {
        self.listeners.total()
    }

    /// Tears the page down: pending timers are dropped and no listener fires again.
    pub fn unload(&mut self) {
        let timers = self.clear_all_timers();
        let listeners = self.listeners.clear();
        self.unloaded = true;
        self.trace_line(format!(
            "[page] unload timers_cleared={timers} listeners_dropped={listeners}"
        ));
    }

    pub fn is_unloaded(&self) -> bool {
        self.unloaded
    }

    // ---- inspection ---------------------------------------------------------

    pub fn select_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.dom.query_selector_all(selector)
    }

    pub fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.dom.query_selector_all(selector)?.len())
    }

    pub fn value_of(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.value(target)
    }

    pub fn text_of(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.text_content(target))
    }

    pub fn attr_of(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.dom.attr(target, name))
    }

    pub fn style_of(&self, selector: &str, property: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.dom.style_get(target, property)
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        Ok(self.dom.class_contains(target, class_name))
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.dom.is_valid_node(node) && self.dom.is_connected(node)
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    pub fn console_logs(&self) -> &[String] {
        &self.console
    }

    pub fn take_console_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.console)
    }

    /// Forms whose submit went through, in submission order.
    pub fn submissions(&self) -> &[NodeId] {
        &self.submissions
    }

    // ---- assertions ---------------------------------------------------------

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(self.assertion_failed(selector, target, expected, actual));
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        if actual != expected {
            return Err(self.assertion_failed(selector, target, expected, actual));
        }
        Ok(())
    }

    pub fn assert_style(&self, selector: &str, property: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.style_get(target, property)?;
        if actual != expected {
            return Err(self.assertion_failed(selector, target, expected, actual));
        }
        Ok(())
    }

    pub fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class_name);
        if actual != expected {
            return Err(self.assertion_failed(
                selector,
                target,
                &format!("class {class_name} present={expected}"),
                format!("class {class_name} present={actual}"),
            ));
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        self.select_one(selector).map(|_| ())
    }

    pub fn assert_missing(&self, selector: &str) -> Result<()> {
        if let Some(found) = self.dom.query_selector(selector)? {
            return Err(self.assertion_failed(selector, found, "no match", "match".into()));
        }
        Ok(())
    }

    pub fn assert_count(&self, selector: &str, expected: usize) -> Result<()> {
        let actual = self.count(selector)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: truncate_chars(&self.dom.dump_node(self.dom.root), 200),
            });
        }
        Ok(())
    }

    // ---- internals ----------------------------------------------------------

    pub(crate) fn console_log(&mut self, line: String) {
        self.trace_line(format!("[console] {line}"));
        self.console.push(line);
    }

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn select_text_control(&self, selector: &str) -> Result<NodeId> {
        let target = self.select_one(selector)?;
        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }
        Ok(target)
    }

    fn ensure_loaded(&self) -> Result<()> {
        if self.unloaded {
            return Err(Error::Runtime("page has been unloaded".into()));
        }
        Ok(())
    }

    fn assertion_failed(
        &self,
        selector: &str,
        target: NodeId,
        expected: &str,
        actual: String,
    ) -> Error {
        Error::AssertionFailed {
            selector: selector.to_string(),
            expected: expected.to_string(),
            actual,
            dom_snippet: truncate_chars(&self.dom.dump_node(target), 200),
        }
    }

    pub(crate) fn is_tag(&self, node: NodeId, tag: &str) -> bool {
        self.dom
            .tag_name(node)
            .is_some_and(|name| name.eq_ignore_ascii_case(tag))
    }

    fn is_submit_control(&self, node: NodeId) -> bool {
        let kind = self
            .dom
            .attr(node, "type")
            .map(|kind| kind.to_ascii_lowercase());
        if self.is_tag(node, "button") {
            return kind.as_deref().is_none_or(|kind| kind == "submit");
        }
        self.is_tag(node, "input") && matches!(kind.as_deref(), Some("submit" | "image"))
    }

    fn submit_form(&mut self, form: NodeId) -> Result<()> {
        let outcome = self.dispatch_event(form, "submit")?;
        if outcome.default_prevented {
            return Ok(());
        }
        self.submissions.push(form);
        let label = self.trace_node_label(form);
        self.trace_event_line(format!("[event] submit accepted form={label}"));
        Ok(())
    }

    pub(crate) fn remove_node(&mut self, node: NodeId) -> Result<()> {
        self.cancel_timers_within(node);
        self.dom.remove_node(node)
    }

    pub(crate) fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<EventState> {
        let mut event = EventState::new(event_type, target);

        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.dom.parent(node);
        }
        path.reverse();

        let ancestors = &path[..path.len().saturating_sub(1)];

        // Capture phase, then target (capture listeners first), then bubble.
        for node in ancestors {
            event.current_target = *node;
            self.invoke_listeners(*node, &mut event, true)?;
        }
        event.current_target = target;
        self.invoke_listeners(target, &mut event, true)?;
        self.invoke_listeners(target, &mut event, false)?;
        for node in ancestors.iter().rev() {
            event.current_target = *node;
            self.invoke_listeners(*node, &mut event, false)?;
        }

        self.trace_event_done(&event);
        Ok(event)
    }

    fn invoke_listeners(&mut self, node_id: NodeId, event: &mut EventState, capture: bool) -> Result<()> {
        let listeners = self.listeners.get(node_id, &event.event_type, capture);
        for listener in listeners {
            if self.trace.enabled {
                let phase = if capture { "capture" } else { "bubble" };
                let target_label = self.trace_node_label(event.target);
                let current_label = self.trace_node_label(event.current_target);
                self.trace_event_line(format!(
                    "[event] {} target={} current={} phase={} default_prevented={}",
                    event.event_type, target_label, current_label, phase, event.default_prevented
                ));
            }
            self.run_handler(&listener.handler, event)?;
        }
        Ok(())
    }

    fn trace_event_done(&mut self, event: &EventState) {
        if !self.trace.enabled {
            return;
        }
        let target_label = self.trace_node_label(event.target);
        let current_label = self.trace_node_label(event.current_target);
        self.trace_event_line(format!(
            "[event] done {} target={} current={} default_prevented={}",
            event.event_type, target_label, current_label, event.default_prevented
        ));
    }
}
