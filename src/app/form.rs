//! Customer drafts backing the add form and the edit modal.
//!
//! The two flows never share a draft: the add form owns one for the whole
//! session and the edit modal carries its own, seeded from the edit target.

use crate::api::{Customer, CustomerFields};

/// Input fields of a customer form, in tab order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DraftField {
    #[default]
    Name,
    Email,
    Phone,
    Address,
}

impl DraftField {
    pub const ALL: [DraftField; 4] = [
        DraftField::Name,
        DraftField::Email,
        DraftField::Phone,
        DraftField::Address,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DraftField::Name => "Name",
            DraftField::Email => "Email",
            DraftField::Phone => "Phone",
            DraftField::Address => "Address",
        }
    }

    pub fn next(self) -> Self {
        match self {
            DraftField::Name => DraftField::Email,
            DraftField::Email => DraftField::Phone,
            DraftField::Phone => DraftField::Address,
            DraftField::Address => DraftField::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            DraftField::Name => DraftField::Address,
            DraftField::Email => DraftField::Name,
            DraftField::Phone => DraftField::Email,
            DraftField::Address => DraftField::Phone,
        }
    }
}

/// Text typed into a customer form plus the field that has focus.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub active: DraftField,
}

impl CustomerDraft {
    pub fn from_customer(c: &Customer) -> Self {
        Self {
            name: c.name.clone(),
            email: c.email.clone(),
            phone: c.phone.clone(),
            address: c.address.clone(),
            active: DraftField::Name,
        }
    }

    pub fn value(&self, field: DraftField) -> &str {
        match field {
            DraftField::Name => &self.name,
            DraftField::Email => &self.email,
            DraftField::Phone => &self.phone,
            DraftField::Address => &self.address,
        }
    }

    fn value_mut(&mut self, field: DraftField) -> &mut String {
        match field {
            DraftField::Name => &mut self.name,
            DraftField::Email => &mut self.email,
            DraftField::Phone => &mut self.phone,
            DraftField::Address => &mut self.address,
        }
    }

    pub fn push_char(&mut self, c: char) {
        let field = self.active;
        self.value_mut(field).push(c);
    }

    pub fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
    }

    pub fn focus_next(&mut self) {
        self.active = self.active.next();
    }

    pub fn focus_prev(&mut self) {
        self.active = self.active.prev();
    }

    /// Fields left empty. Whitespace counts as content.
    pub fn missing_fields(&self) -> Vec<DraftField> {
        DraftField::ALL
            .into_iter()
            .filter(|f| self.value(*f).is_empty())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn to_fields(&self) -> CustomerFields {
        CustomerFields {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
        }
    }
}
