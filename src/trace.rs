use crate::dom::NodeId;
use crate::error::{Error, Result};
use crate::page::Page;

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) events: bool,
    pub(crate) timers: bool,
    pub(crate) to_stderr: bool,
    pub(crate) logs: Vec<String>,
    pub(crate) log_limit: usize,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            events: true,
            timers: true,
            to_stderr: true,
            logs: Vec::new(),
            log_limit: 10_000,
        }
    }
}

impl Page {
    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace.logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace.to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace.events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace.timers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Runtime(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace.log_limit = max_entries;
        if self.trace.logs.len() > max_entries {
            let excess = self.trace.logs.len() - max_entries;
            self.trace.logs.drain(..excess);
        }
        Ok(())
    }

    pub(crate) fn trace_event_line(&mut self, line: String) {
        if self.trace.events {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_timer_line(&mut self, line: String) {
        if self.trace.timers {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        if !self.trace.enabled {
            return;
        }
        if self.trace.to_stderr {
            eprintln!("{line}");
        }
        if self.trace.logs.len() >= self.trace.log_limit {
            self.trace.logs.remove(0);
        }
        self.trace.logs.push(line);
    }

    /// Short CSS-like label for trace output, e.g. `div#main.flash.error`.
    pub(crate) fn trace_node_label(&self, node_id: NodeId) -> String {
        if node_id == self.dom.root {
            return "#document".into();
        }
        let Some(element) = self.dom.element(node_id) else {
            return format!("node-{}", node_id.0);
        };
        let mut label = element.tag_name.clone();
        if let Some(id) = element.attrs.get("id").filter(|id| !id.is_empty()) {
            label.push('#');
            label.push_str(id);
        }
        if let Some(classes) = element.attrs.get("class") {
            for class_name in classes.split_whitespace() {
                label.push('.');
                label.push_str(class_name);
            }
        }
        label
    }
}
