// handlers/mod.rs - two security tiers
//
// Public (no session) → Protected (session resolved by middleware, every
// repository call scoped to the principal)
pub mod protected;
pub mod public;
