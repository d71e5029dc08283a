//! Delivery address and postal-code resolution state.
//!
//! The resolver never performs I/O itself. Editing the CEP hands out a
//! [`LookupTicket`]; whoever performs the directory lookup returns the
//! ticket together with a [`LookupOutcome`]. Each edit bumps a sequence
//! number, and only the outcome for the most recent ticket is applied, so a
//! slow response for an old CEP can never overwrite a newer one.

use serde::{Deserialize, Serialize};

use crate::types::{Cep, digits_only, mask_cep};

/// Shown when the directory has no entry for the CEP.
pub const CEP_NOT_FOUND: &str = "CEP não encontrado.";
/// Shown when the directory could not be reached.
pub const CEP_LOOKUP_FAILED: &str = "Erro ao buscar CEP. Tente novamente.";

/// Delivery address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Masked CEP as displayed (`00000-000`).
    pub cep: String,
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    /// Two-letter state code.
    pub state: String,
    pub number: String,
    pub complement: String,
}

/// The part of an address the directory knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

/// Result of a directory lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(ResolvedAddress),
    NotFound,
    /// The directory could not be reached or answered garbage.
    Failed,
}

/// A lookup request issued by [`AddressResolver::set_cep`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    seq: u64,
    cep: Cep,
}

impl LookupTicket {
    /// Sequence number of the edit that issued this ticket.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// The CEP to look up.
    #[must_use]
    pub const fn cep(&self) -> &Cep {
        &self.cep
    }
}

/// Address form state plus CEP validity.
#[derive(Debug, Clone, Default)]
pub struct AddressResolver {
    address: Address,
    seq: u64,
    searching: bool,
    valid: bool,
    error: Option<&'static str>,
}

impl AddressResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a CEP edit.
    ///
    /// Returns a ticket when the edit completes a new 8-digit CEP. Any edit
    /// that changes the digits clears validity and errors immediately and
    /// invalidates lookups still in flight.
    pub fn set_cep(&mut self, input: &str) -> Option<LookupTicket> {
        let masked = mask_cep(input);
        if digits_only(&masked) == digits_only(&self.address.cep) {
            self.address.cep = masked;
            return None;
        }

        self.address.cep = masked;
        self.seq += 1;
        self.valid = false;
        self.error = None;

        match Cep::parse(&self.address.cep) {
            Ok(cep) => {
                self.searching = true;
                Some(LookupTicket { seq: self.seq, cep })
            }
            Err(_) => {
                self.searching = false;
                None
            }
        }
    }

    /// Apply a lookup outcome.
    ///
    /// Returns `false` (and changes nothing) if the ticket is stale.
    pub fn apply(&mut self, ticket: &LookupTicket, outcome: LookupOutcome) -> bool {
        if ticket.seq != self.seq {
            return false;
        }

        self.searching = false;
        match outcome {
            LookupOutcome::Found(resolved) => {
                self.address.street = resolved.street;
                self.address.neighborhood = resolved.neighborhood;
                self.address.city = resolved.city;
                self.address.state = resolved.state;
                self.valid = true;
                self.error = None;
            }
            LookupOutcome::NotFound => {
                self.valid = false;
                self.error = Some(CEP_NOT_FOUND);
            }
            LookupOutcome::Failed => {
                self.valid = false;
                self.error = Some(CEP_LOOKUP_FAILED);
            }
        }
        true
    }

    /// Street, neighborhood, city and state stay editable after a lookup
    /// fills them. Editing them leaves CEP validity untouched.
    pub fn set_street(&mut self, value: &str) {
        value.clone_into(&mut self.address.street);
    }

    pub fn set_neighborhood(&mut self, value: &str) {
        value.clone_into(&mut self.address.neighborhood);
    }

    pub fn set_city(&mut self, value: &str) {
        value.clone_into(&mut self.address.city);
    }

    pub fn set_state(&mut self, value: &str) {
        value.clone_into(&mut self.address.state);
    }

    pub fn set_number(&mut self, value: &str) {
        value.clone_into(&mut self.address.number);
    }

    pub fn set_complement(&mut self, value: &str) {
        value.clone_into(&mut self.address.complement);
    }

    #[must_use]
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// True while a lookup for the current CEP is outstanding.
    #[must_use]
    pub const fn is_searching(&self) -> bool {
        self.searching
    }

    /// True once the current CEP has been resolved by the directory.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Lookup error for the current CEP, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&'static str> {
        self.error
    }
}
