//! Per-thread template registry: each submitter thread gets its own
//! [`StructMessage`], lazily cloned from the process-wide base template.
//!
//! All operations are meant to be called with the logger's own mutex
//! already held (see [`crate::logger::Logger`]); this type carries no
//! locking of its own.

use std::collections::HashMap;
use std::thread::ThreadId;

use crate::message::StructMessage;

#[derive(Default)]
pub struct Registry {
    entries: HashMap<ThreadId, StructMessage>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Returns the entry for `tid`, cloning it from `base` on first touch.
    /// Entries are never removed, to support long-lived thread ids.
    pub fn find_or_create(&mut self, tid: ThreadId, base: &StructMessage) -> &mut StructMessage {
        self.entries.entry(tid).or_insert_with(|| base.clone())
    }

    /// Returns the existing entry for `tid`, if any, without creating one.
    pub fn find(&mut self, tid: ThreadId) -> Option<&mut StructMessage> {
        self.entries.get_mut(&tid)
    }

    /// Assigns `new_base`'s template into every registered entry.
    pub fn broadcast_format(&mut self, new_base: &StructMessage) {
        for entry in self.entries.values_mut() {
            entry.adopt(new_base);
        }
    }

    /// Sets `name` to `value` on every registered entry.
    pub fn broadcast_value(&mut self, name: &str, value: &str) {
        for entry in self.entries.values_mut() {
            entry.set_value(name, value.to_owned());
        }
    }
}
