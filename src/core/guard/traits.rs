/*!
 * Guard Traits
 *
 * Core abstractions for releasable memory owners
 */

use super::GuardMetadata;
use crate::core::errors::MemoryResult;

/// Core guard trait
///
/// All owners of a memory block implement this to provide:
/// - Resource type identification
/// - Metadata access
/// - Manual, idempotent release
pub trait Guard: Send {
    /// Resource type name for logging/debugging
    fn resource_type(&self) -> &'static str;

    /// Get guard metadata
    fn metadata(&self) -> &GuardMetadata;

    /// Check if guard still owns its resource
    fn is_active(&self) -> bool;

    /// Release the resource now
    ///
    /// Calling this on an inactive guard is a no-op that returns `Ok(())`.
    fn release(&mut self) -> MemoryResult<()>;
}

/// Guards released from `Drop`
///
/// Separates drop logic from `Drop` so it stays testable.
pub trait GuardDrop: Guard {
    /// Release on drop, logging instead of panicking
    fn on_drop(&mut self) {
        if !self.is_active() {
            return;
        }

        let resource = self.resource_type();
        let lifetime_us = self.metadata().lifetime_micros();
        match self.release() {
            Ok(()) => tracing::debug!(resource, lifetime_us, "released on drop"),
            Err(e) => tracing::error!(resource, error = %e, "release on drop failed"),
        }
    }
}
