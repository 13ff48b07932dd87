//! Strongly-typed identifiers over the rental schema.
//!
//! The underlying database uses plain integer surrogate keys; these newtypes
//! keep a film id from ever being handed to an operation that expects an
//! inventory id.

use serde::{Deserialize, Serialize};

/// Identifier of a film title (reference data).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilmId(i32);

/// Identifier of a customer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(i32);

/// Identifier of one rentable copy of a film at a store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryId(i32);

/// Identifier of a rental row (open or closed).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RentalId(i32);

/// Identifier of the staff member recording a rental.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(i32);

macro_rules! impl_int_newtype {
    ($t:ty) => {
        impl $t {
            pub const fn new(raw: i32) -> Self {
                Self(raw)
            }

            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i32> for $t {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i32 {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_int_newtype!(FilmId);
impl_int_newtype!(CustomerId);
impl_int_newtype!(InventoryId);
impl_int_newtype!(RentalId);
impl_int_newtype!(StaffId);
