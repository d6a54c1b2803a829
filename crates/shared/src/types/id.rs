//! Strongly typed UUID identifiers.
//!
//! Each kind of record gets its own wrapper so a statement line id can never
//! be handed to a cheque lookup by mistake.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generates a fresh UUID v7, so ids sort by creation time.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wraps a UUID read from storage or configuration.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Unwraps to the raw UUID for database columns.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                raw.trim().parse().map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_newtype!(
    /// A company book. Every row in the store belongs to exactly one tenant.
    TenantId
);
uuid_newtype!(
    /// A bank account registered against a GL account.
    BankAccountId
);
uuid_newtype!(
    /// One statement import batch.
    StatementImportId
);
uuid_newtype!(
    /// One line of an imported bank statement.
    StatementLineId
);
uuid_newtype!(
    /// A cheque book with its number range.
    ChequeBookId
);
uuid_newtype!(
    /// A cheque, incoming or outgoing.
    ChequeId
);
