// handlers/mod.rs - Handler tiers
//
// Public (no auth) and Protected (session token required). Protected
// handlers receive the caller's `Identity` from the auth middleware.
pub mod extract;
pub mod public;
pub mod protected;
