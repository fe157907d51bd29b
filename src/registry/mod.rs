//! # Form Registry
//!
//! Ordered catalog of forms. Registration order is significant twice over:
//! the decoder takes the first form whose pattern matches a line, and the
//! palette lists forms within a category in this order.
//!
//! A registry is built once, explicitly, and passed by reference. It is
//! never mutated after startup, so any number of decoders and encoders may
//! share it across threads.

mod form;

pub use form::{ConstructFn, DecodeFn, EncodeFn, Form, Role};

use indexmap::IndexMap;
use regex::Captures;

use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct Registry {
    forms: IndexMap<String, Form>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in catalog.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        crate::forms::register_builtin(&mut registry)?;
        Ok(registry)
    }

    /// Add a form. Fails when the type name is taken.
    pub fn register(&mut self, form: Form) -> Result<()> {
        if self.forms.contains_key(form.type_name()) {
            return Err(Error::DuplicateType(form.type_name().to_string()));
        }
        self.forms.insert(form.type_name().to_string(), form);
        Ok(())
    }

    pub fn lookup(&self, type_name: &str) -> Option<&Form> {
        self.forms.get(type_name)
    }

    /// Like `lookup`, but a missing type is an error.
    pub fn get(&self, type_name: &str) -> Result<&Form> {
        self.lookup(type_name)
            .ok_or_else(|| Error::UnknownType(type_name.to_string()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.forms.contains_key(type_name)
    }

    /// All forms, registration order preserved.
    pub fn forms(&self) -> impl Iterator<Item = &Form> {
        self.forms.values()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Every form whose pattern matches somewhere in `text`.
    pub fn matching(&self, text: &str) -> Vec<&Form> {
        self.forms().filter(|f| f.pattern().is_match(text)).collect()
    }

    /// The earliest-registered form matching `text`, with its captures.
    pub fn first_match<'t>(&self, text: &'t str) -> Option<(&Form, Captures<'t>)> {
        self.forms().find_map(|f| f.matches(text).map(|c| (f, c)))
    }

    /// The earliest-registered expression form whose pattern spans all of
    /// `text`. Used to turn argument text into an attached expression.
    pub fn expression_for<'t>(&self, text: &'t str) -> Option<(&Form, Captures<'t>)> {
        self.forms()
            .filter(|f| f.role() == Role::Expression)
            .find_map(|f| f.matches_whole(text).map(|c| (f, c)))
    }
}
