//! [`StructMessage`] pairs one compiled [`Template`] with the logic that
//! stamps a [`Record`](crate::record::Record) into its reserved slots before
//! rendering.

use uuid::Uuid;

use crate::error::TemplateError;
use crate::record::Record;
use crate::template::Template;

const SLOT_MSG: &str = "MSG";
const SLOT_LEVEL: &str = "LEVEL";
const SLOT_TIME: &str = "TIME";
const SLOT_UUID: &str = "_LOGGER_OPTIONS_UUID";

/// A template plus the record-stamping behavior the dispatcher needs.
#[derive(Clone, Debug)]
pub struct StructMessage {
    template: Template,
}

impl StructMessage {
    /// An empty-format message, handy as a registry seed before any base
    /// format has been set.
    pub fn empty() -> StructMessage {
        StructMessage {
            // An empty format string always parses.
            template: Template::parse("").expect("empty format is always well-bracketed"),
        }
    }

    /// Reparses `format` as the new template. On a [`TemplateError`] the
    /// previous template is left untouched, since the parse happens into a
    /// fresh value that only replaces `self.template` on success.
    pub fn set_format(&mut self, format: &str) -> Result<(), TemplateError> {
        let parsed = Template::parse(format)?;
        self.template = parsed;
        Ok(())
    }

    /// Adopts `other`'s template by value.
    pub fn adopt(&mut self, other: &StructMessage) {
        self.template = other.template.clone();
    }

    /// Delegates to the template, returning whether the named slot exists.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        self.template.set_value(name, value)
    }

    /// Stamps the reserved slots from `record` and renders the result.
    pub fn serialize(&mut self, record: &Record) -> String {
        self.template.set_value(SLOT_MSG, record.message());
        self.template.set_value(SLOT_LEVEL, record.level().to_string());
        self.template.set_value(SLOT_TIME, record.timestamp().to_string());
        if self.template.has_slot(SLOT_UUID) {
            self.template.set_value(SLOT_UUID, Uuid::new_v4().to_string());
        }
        self.template.render()
    }
}
