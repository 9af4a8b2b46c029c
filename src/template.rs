//! Compiles a `<NAME>`-bracketed format string into an alternating sequence
//! of literal text and named slots, resolving environment-variable slots
//! eagerly at parse time.

use std::env;

use crate::error::TemplateError;

/// One named, mutable placeholder in a compiled [`Template`].
#[derive(Clone, Debug)]
struct Slot {
    name: String,
    value: String,
}

/// A parsed format string: `text[0] slot[0] text[1] slot[1] ... text[n]`.
///
/// Invariant: `text.len() == slots.len() + 1`.
#[derive(Clone, Debug)]
pub struct Template {
    text: Vec<String>,
    slots: Vec<Slot>,
}

impl Template {
    /// Parses `format`. Whitespace is stripped first; the remainder must be
    /// well-bracketed (`<` and `>` nest to depth at most one and balance to
    /// zero). Slots whose name matches a currently-defined environment
    /// variable are resolved immediately and folded into the surrounding
    /// text, so they never show up in [`Template::set_value`].
    pub fn parse(format: &str) -> Result<Template, TemplateError> {
        let stripped: String = format.chars().filter(|c| !c.is_whitespace()).collect();
        check_well_bracketed(&stripped)?;

        let mut text = Vec::new();
        let mut slots = Vec::new();
        let mut rest = stripped.as_str();
        loop {
            match rest.find('<') {
                None => {
                    text.push(rest.to_owned());
                    break;
                }
                Some(open) => {
                    text.push(rest[..open].to_owned());
                    let after_open = &rest[open + 1..];
                    // Well-bracketedness guarantees a matching '>' exists.
                    let close = after_open.find('>').unwrap();
                    slots.push(Slot {
                        name: after_open[..close].to_owned(),
                        value: String::new(),
                    });
                    rest = &after_open[close + 1..];
                }
            }
        }

        let mut template = Template { text, slots };
        template.resolve_env();
        Ok(template)
    }

    /// Walks slots from last to first, collapsing any whose name is a
    /// defined environment variable into the surrounding text.
    fn resolve_env(&mut self) {
        for i in (0..self.slots.len()).rev() {
            if let Ok(value) = env::var(&self.slots[i].name) {
                let tail = self.text.remove(i + 1);
                self.text[i] = format!("{}{}{}", self.text[i], value, tail);
                self.slots.remove(i);
            }
        }
    }

    /// Sets the value of the first slot named `name`. Returns whether such a
    /// slot exists.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.slots.iter_mut().find(|s| s.name == name) {
            Some(slot) => {
                slot.value = value.into();
                true
            }
            None => false,
        }
    }

    /// True if the template has a slot with this name (regardless of its
    /// current value).
    pub fn has_slot(&self, name: &str) -> bool {
        self.slots.iter().any(|s| s.name == name)
    }

    /// Concatenates `text[0] · value[0] · text[1] · ... · text[n]`.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, slot) in self.slots.iter().enumerate() {
            out.push_str(&self.text[i]);
            out.push_str(&slot.value);
        }
        out.push_str(&self.text[self.slots.len()]);
        out
    }
}

fn check_well_bracketed(format: &str) -> Result<(), TemplateError> {
    let mut depth = 0i32;
    for c in format.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            _ => {}
        }
        if !(0..=1).contains(&depth) {
            return Err(TemplateError {
                format: format.to_owned(),
                reason: "brackets are nested or unbalanced",
            });
        }
    }
    if depth != 0 {
        return Err(TemplateError {
            format: format.to_owned(),
            reason: "unterminated '<' with no matching '>'",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_template_renders_empty() {
        let t = Template::parse("").unwrap();
        assert_eq!(t.render(), "");
    }

    #[test]
    fn plain_text_with_no_slots() {
        let t = Template::parse("hello world").unwrap();
        // whitespace is stripped before parsing, per the grammar.
        assert_eq!(t.render(), "helloworld");
    }

    #[test]
    fn whitespace_is_stripped_before_parsing() {
        let a = Template::parse("a < NAME >b").unwrap();
        let b = Template::parse("a<NAME>b").unwrap();
        let mut a = a;
        let mut b = b;
        a.set_value("NAME", "x");
        b.set_value("NAME", "x");
        assert_eq!(a.render(), b.render());
    }

    #[test]
    fn set_value_and_render() {
        let mut t = Template::parse("msg=<MSG> end").unwrap();
        assert!(t.set_value("MSG", "hi"));
        assert_eq!(t.render(), "msg=hiend");
    }

    #[test]
    fn set_value_on_missing_slot_is_a_no_op_reporting_false() {
        let mut t = Template::parse("<MSG>").unwrap();
        assert!(!t.set_value("NOPE", "x"));
        assert_eq!(t.render(), "");
    }

    #[test]
    fn setting_same_value_twice_is_idempotent() {
        let mut t = Template::parse("<A>").unwrap();
        t.set_value("A", "x");
        let once = t.render();
        t.set_value("A", "x");
        assert_eq!(t.render(), once);
    }

    #[test]
    fn dangling_open_bracket_is_bad_format() {
        assert!(Template::parse("<A").is_err());
    }

    #[test]
    fn nested_brackets_are_bad_format() {
        assert!(Template::parse("<<A>>").is_err());
    }

    #[test]
    fn unmatched_close_bracket_is_bad_format() {
        assert!(Template::parse("A>B").is_err());
    }

    #[test]
    fn env_var_slots_are_resolved_eagerly_and_disappear() {
        std::env::set_var("RINGLOG_TEST_VERS", "1.0");
        let mut t = Template::parse("msg=<MSG> v=<RINGLOG_TEST_VERS> t=<TIME>").unwrap();
        // The env slot is gone: setting it now is a no-op.
        assert!(!t.set_value("RINGLOG_TEST_VERS", "ignored"));
        t.set_value("MSG", "hi");
        t.set_value("TIME", "100");
        assert_eq!(t.render(), "msg=hi v=1.0 t=100");
        std::env::remove_var("RINGLOG_TEST_VERS");
    }

    #[test]
    fn render_length_equals_sum_of_text_and_values() {
        let mut t = Template::parse("a<X>b<Y>c").unwrap();
        t.set_value("X", "12");
        t.set_value("Y", "345");
        let expected_len = "a".len() + "12".len() + "b".len() + "345".len() + "c".len();
        assert_eq!(t.render().len(), expected_len);
    }
}
