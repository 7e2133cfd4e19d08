// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory with:
// - Value objects
// - Commands
// - Errors
// - Aggregate implementation
// - Repository trait
// - Command handler
//
// Shared building blocks (money, ids, unit of work) live alongside.
//
// ============================================================================

pub mod money;
pub mod ids;
pub mod repository;
pub mod product;
pub mod order;
