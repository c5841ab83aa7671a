// handlers/mod.rs - Three security tiers
//
// Public (no auth, optional bearer) → Protected (JWT) → Elevated (JWT + admin)
pub mod elevated;
pub mod protected;
pub mod public;
