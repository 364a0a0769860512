// ABOUTME: Validated domain types for rollout targets.
// ABOUTME: Every value that reaches a URL, file name or remote command passes through here first.

mod context_path;
mod host_name;
mod remote_path;
mod target_id;

pub use context_path::{ContextPath, ContextPathError};
pub use host_name::{HostName, HostNameError};
pub use remote_path::{RemotePath, RemotePathError};
pub use target_id::{TargetId, TargetIdError};
