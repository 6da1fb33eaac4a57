//! Balance-affecting writes.
//!
//! Every operation here inserts, rewrites or deletes transaction rows and
//! applies the matching balance increments inside the same database
//! transaction. Validation happens before the first write, so a rejected
//! command never touches the store.

mod create;
mod delete;
mod update;
