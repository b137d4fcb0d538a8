//! Draft form state shared by both screens

use crate::api::{PersonId, PersonPayload, PersonRecord};

/// Message shown under a field left empty on submit
pub const REQUIRED_MESSAGE: &str = "Please fill out this field.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    City,
    State,
    PostalCode,
}

impl Field {
    /// Display order of the form
    pub const ALL: [Field; 8] = [
        Field::FirstName,
        Field::LastName,
        Field::Email,
        Field::Phone,
        Field::Address,
        Field::City,
        Field::State,
        Field::PostalCode,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "First Name",
            Field::LastName => "Last Name",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::Address => "Address",
            Field::City => "City",
            Field::State => "State",
            Field::PostalCode => "Postal Code",
        }
    }

    /// JSON key on the wire
    pub fn key(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Address => "address",
            Field::City => "city",
            Field::State => "state",
            Field::PostalCode => "postalCode",
        }
    }

    fn index(self) -> usize {
        Field::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    /// Next field, wrapping around
    pub fn next(self) -> Field {
        Field::ALL[(self.index() + 1) % Field::ALL.len()]
    }

    /// Previous field, wrapping around
    pub fn prev(self) -> Field {
        let idx = self.index().checked_sub(1).unwrap_or(Field::ALL.len() - 1);
        Field::ALL[idx]
    }
}

/// In-progress field values plus the record being edited, if any
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub editing_id: Option<PersonId>,
}

impl Draft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Address => &self.address,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::PostalCode => &self.postal_code,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Address => &mut self.address,
            Field::City => &mut self.city,
            Field::State => &mut self.state,
            Field::PostalCode => &mut self.postal_code,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }

    pub fn push(&mut self, field: Field, c: char) {
        self.get_mut(field).push(c);
    }

    pub fn pop(&mut self, field: Field) {
        self.get_mut(field).pop();
    }

    /// Empty every field and leave edit mode
    pub fn reset(&mut self) {
        *self = Draft::default();
    }

    /// Populate from a saved record and enter edit mode for it
    pub fn load(&mut self, record: &PersonRecord) {
        *self = Draft {
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            address: record.address.clone(),
            city: record.city.clone(),
            state: record.state.clone(),
            postal_code: record.postal_code.clone(),
            editing_id: record.id.clone(),
        };
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    /// First field that is still empty (all fields are required)
    pub fn first_missing(&self) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| self.get(*f).trim().is_empty())
    }

    pub fn payload(&self) -> PersonPayload {
        PersonPayload {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            postal_code: self.postal_code.clone(),
        }
    }
}

/// One optional message per known field plus a general slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    general: Option<String>,
}

impl FieldErrors {
    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Address => &mut self.address,
            Field::City => &mut self.city,
            Field::State => &mut self.state,
            Field::PostalCode => &mut self.postal_code,
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        let slot = match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Address => &self.address,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::PostalCode => &self.postal_code,
        };
        slot.as_deref()
    }

    pub fn set(&mut self, field: Field, message: impl Into<String>) {
        *self.slot_mut(field) = Some(message.into());
    }

    pub fn clear(&mut self, field: Field) {
        *self.slot_mut(field) = None;
    }

    pub fn general(&self) -> Option<&str> {
        self.general.as_deref()
    }

    pub fn set_general(&mut self, message: impl Into<String>) {
        self.general = Some(message.into());
    }

    pub fn clear_all(&mut self) {
        *self = FieldErrors::default();
    }

    /// Fields currently carrying a message, in form order
    pub fn fields_with_errors(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_some())
            .collect()
    }
}
