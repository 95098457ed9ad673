/// Data models shared across the Cordon services
///
/// - `tenant`: platform-level tenant accounts and lifecycle status
/// - `project`: the reference tenant-owned entity, fully scope-checked

pub mod project;
pub mod tenant;
