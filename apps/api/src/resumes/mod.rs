// Resume API: generate from "about me" text, persist to the store, read back, delete.
// Handlers only call the store client's operations and the generator trait.

pub mod handlers;
